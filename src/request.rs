//! Authenticated calls against the bank-data provider's REST endpoints.
//!
//! [`RequestClient::request`] does not acquire tokens itself; callers pass the bearer token
//! inside the [`RequestDescriptor`]. Outcomes map as follows:
//!
//! | Response | Result |
//! | --- | --- |
//! | 2xx with a JSON body | `Ok(Some(body))` |
//! | 404 | `Ok(None)` |
//! | 429 | `Err(Error::RateLimited { .. })` |
//! | body is not JSON | `Ok(None)` |
//! | any other status | `Err(Error::Provider { .. })` |
//!
//! No retries are performed.

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	http::{self, RawResponse, ReqwestHttpClient},
	obs::{self, OperationKind, OperationSpan, Outcome},
};

/// Parameters of one authenticated call.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the provider base URL, optionally carrying a query string.
	pub path: String,
	/// JSON payload serialized as the request body.
	pub body: Option<Value>,
	/// Bearer token attached to the call.
	pub access_token: TokenSecret,
}
impl RequestDescriptor {
	/// Creates a descriptor without a body.
	pub fn new(method: Method, path: impl Into<String>, access_token: TokenSecret) -> Self {
		Self { method, path: path.into(), body: None, access_token }
	}

	/// Shorthand for a `GET` descriptor.
	pub fn get(path: impl Into<String>, access_token: TokenSecret) -> Self {
		Self::new(Method::GET, path, access_token)
	}

	/// Shorthand for a `POST` descriptor.
	pub fn post(path: impl Into<String>, access_token: TokenSecret) -> Self {
		Self::new(Method::POST, path, access_token)
	}

	/// Attaches a JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}
}

/// Issues authenticated calls and normalizes provider responses.
#[derive(Clone, Debug)]
pub struct RequestClient {
	http_client: ReqwestHttpClient,
	config: Arc<ClientConfig>,
}
impl RequestClient {
	/// Message used when a failing response carries neither `detail` nor `summary`.
	pub const GENERIC_MESSAGE: &'static str = "Bank data request failed";

	/// Creates a client for the configured provider.
	pub fn new(config: impl Into<Arc<ClientConfig>>, http_client: ReqwestHttpClient) -> Self {
		Self { http_client, config: config.into() }
	}

	/// Performs one call and maps the response.
	pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<Option<Value>> {
		const KIND: OperationKind = OperationKind::DataRequest;

		let span = OperationSpan::new(KIND, "request");

		obs::record_outcome(KIND, Outcome::Attempt);

		let result = span.instrument(self.dispatch(descriptor)).await;
		let outcome = match &result {
			Ok(reply) => reply.outcome(),
			Err(Error::RateLimited { .. }) => Outcome::RateLimited,
			Err(_) => Outcome::Failure,
		};

		obs::record_outcome(KIND, outcome);

		result.map(Reply::into_body)
	}

	async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<Reply> {
		let url = self.config.join(&descriptor.path)?;

		tracing::debug!(method = %descriptor.method, %url, "Sending bank data request.");

		let mut request = http::no_cache_json(
			self.http_client.request(descriptor.method.clone(), url),
		)
		.header(AUTHORIZATION, format!("Bearer {}", descriptor.access_token.expose()))
		.timeout(self.config.request_timeout);

		if let Some(body) = descriptor.body.as_ref() {
			request = request.json(body);
		}

		let response = self.http_client.execute(request).await.map_err(|err| {
			let message = if err.is_timeout() {
				format!("Timed out calling {} {}", descriptor.method, descriptor.path)
			} else {
				format!("Network error calling {} {}: {err}", descriptor.method, descriptor.path)
			};

			tracing::error!(%message, "Bank data request did not complete.");

			Error::provider(None, message)
		})?;

		tracing::debug!(status = response.status.as_u16(), "Bank data response received.");

		interpret(&descriptor.path, response)
	}
}

/// Successful classification of a provider response.
#[derive(Debug, PartialEq)]
pub(crate) enum Reply {
	Body(Value),
	NotFound,
	Unparsable,
}
impl Reply {
	fn outcome(&self) -> Outcome {
		match self {
			Self::Body(_) => Outcome::Success,
			Self::NotFound => Outcome::NotFound,
			Self::Unparsable => Outcome::ParseFailure,
		}
	}

	fn into_body(self) -> Option<Value> {
		match self {
			Self::Body(body) => Some(body),
			Self::NotFound | Self::Unparsable => None,
		}
	}
}

/// Maps a buffered response onto the request client's outcome table.
pub(crate) fn interpret(path: &str, response: RawResponse) -> Result<Reply> {
	let RawResponse { status, metadata, body } = response;

	if status == StatusCode::NOT_FOUND {
		tracing::warn!(%path, "Resource not found.");

		return Ok(Reply::NotFound);
	}

	let parsed = serde_json::from_slice::<Value>(&body);

	// Classified before the parse check so a throttled call never reads as an absent resource.
	if status == StatusCode::TOO_MANY_REQUESTS {
		let detail = parsed.as_ref().ok().and_then(http::provider_detail).unwrap_or_default();

		tracing::error!(%path, %detail, "Bank data rate limit exceeded.");

		return Err(Error::RateLimited { detail, retry_after: metadata.retry_after });
	}

	let data = match parsed {
		Ok(data) => data,
		Err(err) => {
			tracing::error!(
				%path,
				status = status.as_u16(),
				error = %err,
				"Failed to parse JSON response."
			);

			return Ok(Reply::Unparsable);
		},
	};

	if !status.is_success() {
		let message =
			http::provider_detail(&data).unwrap_or_else(|| RequestClient::GENERIC_MESSAGE.into());

		tracing::error!(%path, status = status.as_u16(), %message, "Bank data API error.");

		return Err(Error::provider(Some(status.as_u16()), message));
	}

	Ok(Reply::Body(data))
}
