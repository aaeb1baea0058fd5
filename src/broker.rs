//! Broker facade that pairs one token provider with one request client.
//!
//! A [`Broker`] is constructed once at process start and cloned into every handler. Each
//! call obtains a token through the shared [`TokenProvider`] (cache hit, in-flight join, or
//! fresh fetch) before handing it to the [`RequestClient`]. Typed helpers for the provider's
//! account, institution, and requisition resources live in the submodules.

mod accounts;
mod institutions;
mod requisitions;

pub use requisitions::NewRequisition;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	http::ReqwestHttpClient,
	request::{RequestClient, RequestDescriptor},
	token::TokenProvider,
};

/// Authenticated entry point for the bank-data provider.
#[derive(Clone, Debug)]
pub struct Broker {
	token_provider: TokenProvider,
	request_client: RequestClient,
}
impl Broker {
	/// Creates a broker with a default reqwest transport.
	pub fn new(config: ClientConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}

	/// Creates a broker whose provider and request client share `http_client`.
	pub fn with_http_client(config: ClientConfig, http_client: ReqwestHttpClient) -> Self {
		let config = Arc::new(config);

		Self {
			token_provider: TokenProvider::new(config.clone(), http_client.clone()),
			request_client: RequestClient::new(config, http_client),
		}
	}

	/// Creates a broker from the process environment (see [`ClientConfig::from_env`]).
	pub fn from_env() -> Result<Self> {
		Ok(Self::new(ClientConfig::from_env()?))
	}

	/// Returns the shared token provider.
	pub fn token_provider(&self) -> &TokenProvider {
		&self.token_provider
	}

	/// Returns the request client.
	pub fn request_client(&self) -> &RequestClient {
		&self.request_client
	}

	/// Acquires a token and performs one call against `path`.
	pub async fn send(
		&self,
		method: Method,
		path: impl Into<String>,
		body: Option<Value>,
	) -> Result<Option<Value>> {
		let access_token = self.token_provider.access_token().await?;
		let mut descriptor = RequestDescriptor::new(method, path, access_token);

		descriptor.body = body;

		self.request_client.request(&descriptor).await
	}

	/// Shorthand for a `GET` through [`Broker::send`].
	pub async fn get(&self, path: impl Into<String>) -> Result<Option<Value>> {
		self.send(Method::GET, path, None).await
	}
}

/// Percent-encodes a value for use as a single path segment or query value.
pub(crate) fn encode(value: &str) -> String {
	url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>().replace('+', "%20")
}

/// Fails with a provider error describing an unexpected payload shape.
pub(crate) fn unexpected_shape(resource: &str) -> Error {
	Error::Provider { status: None, message: format!("Unexpected {resource} payload shape") }
}
