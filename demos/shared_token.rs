//! Shows many concurrent handlers sharing one token fetch through a cloned broker.

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
			then.status(200)
				.delay(Duration::from_millis(200))
				.json_body(json!({ "access": "demo-access", "access_expires": 86400 }));
		})
		.await;
	let account_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v2/accounts/demo-account/")
				.header("authorization", "Bearer demo-access");
			then.status(200).json_body(json!({ "id": "demo-account", "status": "READY" }));
		})
		.await;
	let config = ClientConfig::builder(ClientCredentials::new("demo-id", "demo-key"))
		.base_url(Url::parse(&server.base_url())?)
		.build()?;
	let broker = Broker::new(config);
	let handlers = (0..8)
		.map(|_| {
			let broker = broker.clone();

			tokio::spawn(async move { broker.account("demo-account").await })
		})
		.collect::<Vec<_>>();

	for handler in handlers {
		let account = handler.await??;

		println!("Handler saw account: {:?}.", account.map(|value| value["status"].clone()));
	}

	let metrics = broker.token_provider().metrics();

	println!(
		"Token fetches: {}, joins: {}, cache hits: {}.",
		metrics.fetches(),
		metrics.joins(),
		metrics.cache_hits()
	);

	token_mock.assert_calls_async(1).await;
	account_mock.assert_calls_async(8).await;

	Ok(())
}
