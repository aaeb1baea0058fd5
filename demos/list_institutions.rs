//! Lists the institutions serving one country and every country the provider covers, against a
//! local mock of the bank-data API.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use bankdata_broker::{auth::ClientCredentials, broker::Broker, config::ClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/token/new/");
			then.status(200).json_body(json!({ "access": "demo-access", "access_expires": 86400 }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/institutions/").query_param("country", "GB");
			then.status(200).json_body(json!([
				{ "id": "MONZO_MONZGB2L", "name": "Monzo", "countries": ["GB"] },
				{ "id": "REVOLUT_REVOGB21", "name": "Revolut", "countries": ["GB", "IE"] },
			]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/institutions/").query_param_missing("country");
			then.status(200).json_body(json!([
				{ "id": "MONZO_MONZGB2L", "countries": ["GB"] },
				{ "id": "REVOLUT_REVOGB21", "countries": ["GB", "IE", "LT"] },
				{ "id": "N26_NTSBDEB1", "countries": ["DE", "AT"] },
			]));
		})
		.await;

	let config = ClientConfig::builder(ClientCredentials::new("demo-id", "demo-key"))
		.base_url(Url::parse(&server.base_url())?)
		.timeout(Duration::from_secs(10))
		.build()?;
	let broker = Broker::new(config);

	if let Some(institutions) = broker.institutions(Some("GB")).await? {
		for institution in institutions.as_array().into_iter().flatten() {
			println!("GB institution: {}.", institution["name"]);
		}
	}

	println!("Covered countries: {}.", broker.institution_countries().await?.join(", "));

	token_mock.assert_calls_async(1).await;

	Ok(())
}
