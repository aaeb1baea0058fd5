// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
use url::Url;
// self
use bankdata_broker::{
	auth::{ClientCredentials, TokenSecret},
	config::ClientConfig,
	error::Error,
	http::ReqwestHttpClient,
	request::{RequestClient, RequestDescriptor},
};

const ACCOUNT_PATH: &str = "/api/v2/accounts/X/";

fn build_client(server: &MockServer, timeout: StdDuration) -> RequestClient {
	let config = ClientConfig::builder(ClientCredentials::new("id", "key"))
		.base_url(Url::parse(&server.base_url()).expect("Mock base URL should parse."))
		.request_timeout(timeout)
		.build()
		.expect("Client configuration should build successfully.");

	RequestClient::new(config, ReqwestHttpClient::default())
}

fn token() -> TokenSecret {
	TokenSecret::new("tok_abc")
}

#[tokio::test]
async fn success_returns_provider_json_unchanged() {
	let server = MockServer::start_async().await;
	let payload = json!({
		"id": "X",
		"iban": "GB33BUKB20201555555555",
		"institution_id": "SANDBOXFINANCE_SFIN0000",
		"owner_name": "Jane Doe",
		"balances": [{ "amount": "12.50", "currency": "EUR" }],
	});
	let expected = payload.clone();
	let mock = server
		.mock_async(move |when, then| {
			when.method(GET)
				.path(ACCOUNT_PATH)
				.header("authorization", "Bearer tok_abc")
				.header("accept", "application/json")
				.header("cache-control", "no-cache, no-store, must-revalidate")
				.header("pragma", "no-cache")
				.header("expires", "0");
			then.status(200).json_body(payload);
		})
		.await;
	let client = build_client(&server, StdDuration::from_secs(5));
	let data = client
		.request(&RequestDescriptor::get(ACCOUNT_PATH, token()))
		.await
		.expect("Successful call should not fail.")
		.expect("Successful call should carry a body.");

	assert_eq!(data, expected);

	mock.assert_async().await;
}

#[tokio::test]
async fn post_serializes_json_body() {
	let server = MockServer::start_async().await;
	let body =
		json!({ "institution_id": "SANDBOXFINANCE_SFIN0000", "redirect": "https://a.example/cb" });
	let matched = body.clone();
	let mock = server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/api/v2/requisitions/")
				.header("content-type", "application/json")
				.json_body(matched);
			then.status(201)
				.json_body(json!({ "id": "req-1", "link": "https://ob.example/start" }));
		})
		.await;
	let client = build_client(&server, StdDuration::from_secs(5));
	let data = client
		.request(&RequestDescriptor::post("/api/v2/requisitions/", token()).with_body(body))
		.await
		.expect("Creation should succeed.")
		.expect("Creation should return the record.");

	assert_eq!(data["id"], "req-1");

	mock.assert_async().await;
}

#[tokio::test]
async fn not_found_is_none() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ACCOUNT_PATH);
			then.status(404).json_body(json!({ "summary": "Not found.", "detail": "Not found." }));
		})
		.await;

	let client = build_client(&server, StdDuration::from_secs(5));
	let data = client
		.request(&RequestDescriptor::get(ACCOUNT_PATH, token()))
		.await
		.expect("404 must not be an error.");

	assert!(data.is_none());
}

#[tokio::test]
async fn rate_limit_carries_detail_and_retry_hint() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/accounts/X/transactions/");
			then.status(429).header("retry-after", "3600").json_body(json!({
				"summary": "Rate limit exceeded",
				"detail": "Daily request limit set by the Institution has been exceeded.",
				"status_code": 429,
			}));
		})
		.await;

	let client = build_client(&server, StdDuration::from_secs(5));
	let err = client
		.request(&RequestDescriptor::get("/api/v2/accounts/X/transactions/", token()))
		.await
		.expect_err("429 should raise a rate-limit error.");

	assert_eq!(err.http_status(), 429);

	match err {
		Error::RateLimited { detail, retry_after } => {
			assert_eq!(detail, "Daily request limit set by the Institution has been exceeded.");
			assert_eq!(retry_after, Some(time::Duration::hours(1)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn rate_limit_ignores_body_content() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ACCOUNT_PATH);
			then.status(429).body("slow down");
		})
		.await;

	let client = build_client(&server, StdDuration::from_secs(5));
	let err = client
		.request(&RequestDescriptor::get(ACCOUNT_PATH, token()))
		.await
		.expect_err("429 should raise a rate-limit error.");

	assert!(err.is_rate_limited());
}

#[tokio::test]
async fn server_error_maps_to_provider_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ACCOUNT_PATH);
			then.status(401).json_body(json!({
				"summary": "Authentication failed",
				"detail": "No active account found with the given credentials",
			}));
		})
		.await;

	let client = build_client(&server, StdDuration::from_secs(5));
	let err = client
		.request(&RequestDescriptor::get(ACCOUNT_PATH, token()))
		.await
		.expect_err("401 should raise a provider error.");

	assert_eq!(err.http_status(), 500);
	assert!(matches!(
		err,
		Error::Provider { status: Some(401), ref message }
			if message == "No active account found with the given credentials"
	));
}

#[tokio::test]
async fn invalid_json_is_none() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ACCOUNT_PATH);
			then.status(200).header("content-type", "text/html").body("<html>maintenance</html>");
		})
		.await;

	let client = build_client(&server, StdDuration::from_secs(5));
	let data: Option<Value> = client
		.request(&RequestDescriptor::get(ACCOUNT_PATH, token()))
		.await
		.expect("Unparsable body must not be an error.");

	assert!(data.is_none());
}

#[tokio::test]
async fn timeout_maps_to_provider_error_without_status() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ACCOUNT_PATH);
			then.status(200).delay(StdDuration::from_millis(500)).json_body(json!({}));
		})
		.await;

	let client = build_client(&server, StdDuration::from_millis(50));
	let err = client
		.request(&RequestDescriptor::get(ACCOUNT_PATH, token()))
		.await
		.expect_err("Slow responses should time out.");

	assert!(matches!(err, Error::Provider { status: None, .. }));
}
