// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	config::ClientConfig,
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Secret pair exchanged for access tokens.
	pub credentials: ClientCredentials,
	/// Optional base URL override.
	pub base_url: Option<Url>,
	/// Token-issuance timeout.
	pub token_timeout: StdDuration,
	/// Data-endpoint timeout.
	pub request_timeout: StdDuration,
	/// Expiry safety margin.
	pub expiry_margin: Duration,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided credentials.
	pub fn new(credentials: ClientCredentials) -> Self {
		Self {
			credentials,
			base_url: None,
			token_timeout: ClientConfig::DEFAULT_TIMEOUT,
			request_timeout: ClientConfig::DEFAULT_TIMEOUT,
			expiry_margin: Duration::ZERO,
		}
	}

	/// Overrides the provider base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets both the token and the data-endpoint timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.token_timeout = timeout;
		self.request_timeout = timeout;

		self
	}

	/// Sets the token-issuance timeout.
	pub fn token_timeout(mut self, timeout: StdDuration) -> Self {
		self.token_timeout = timeout;

		self
	}

	/// Sets the data-endpoint timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Expires cached tokens `margin` before the provider says they expire.
	pub fn expiry_margin(mut self, margin: Duration) -> Self {
		self.expiry_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(ClientConfig::DEFAULT_BASE_URL)
				.map_err(|source| ConfigError::InvalidBaseUrl { source })?,
		};

		validate_base_url(&base_url)?;
		self.credentials.validate()?;

		Ok(ClientConfig {
			base_url,
			credentials: self.credentials,
			token_timeout: self.token_timeout,
			request_timeout: self.request_timeout,
			expiry_margin: self.expiry_margin,
		})
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedBaseUrl { url: url.to_string() })
	}
}
