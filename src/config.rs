//! Client configuration: provider base URL, credentials, timeouts, and expiry margin.

mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ClientCredentials, error::ConfigError};

/// Environment variable holding the provider `secret_id`.
pub const ENV_SECRET_ID: &str = "GOCARDLESS_SECRET_ID";
/// Environment variable holding the provider `secret_key`.
pub const ENV_SECRET_KEY: &str = "GOCARDLESS_SECRET_KEY";
/// Optional environment variable overriding the provider base URL.
pub const ENV_API_URL: &str = "GOCARDLESS_API_URL";
/// Optional environment variable overriding both request timeouts, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "GOCARDLESS_TIMEOUT_SECS";

/// Validated settings shared by the token provider and the request client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Provider base URL; request paths are joined onto it.
	pub base_url: Url,
	/// Secret pair exchanged for access tokens.
	pub credentials: ClientCredentials,
	/// Upper bound for a single token-issuance call.
	pub token_timeout: StdDuration,
	/// Upper bound for a single data-endpoint call.
	pub request_timeout: StdDuration,
	/// Safety margin subtracted from token expiry when checking validity.
	pub expiry_margin: Duration,
}
impl ClientConfig {
	/// Production base URL of the Bank Account Data API.
	pub const DEFAULT_BASE_URL: &'static str = "https://bankaccountdata.gocardless.com";
	/// Relative path of the token-issuance endpoint.
	pub const TOKEN_PATH: &'static str = "/api/v2/token/new/";
	/// Default timeout applied to both token and data calls.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Returns a builder seeded with the provided credentials and default settings.
	pub fn builder(credentials: ClientCredentials) -> ClientConfigBuilder {
		ClientConfigBuilder::new(credentials)
	}

	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads configuration through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name).filter(|value| !value.is_empty()).ok_or(ConfigError::MissingEnv { name })
		};
		let credentials =
			ClientCredentials::new(required(ENV_SECRET_ID)?, required(ENV_SECRET_KEY)?);
		let mut builder = Self::builder(credentials);

		if let Some(raw) = lookup(ENV_API_URL).filter(|value| !value.is_empty()) {
			let url =
				Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

			builder = builder.base_url(url);
		}
		if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|value| !value.is_empty()) {
			let secs = raw
				.trim()
				.parse::<u64>()
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or(ConfigError::InvalidEnv { name: ENV_TIMEOUT_SECS, value: raw.clone() })?;

			builder = builder.timeout(StdDuration::from_secs(secs));
		}

		builder.build()
	}

	/// Absolute URL of the token-issuance endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		self.join(Self::TOKEN_PATH)
	}

	/// Joins a request path (optionally carrying a query string) onto the base URL.
	pub fn join(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

		move |name| map.get(name).cloned()
	}

	#[test]
	fn from_lookup_reads_required_secrets_and_defaults() {
		let lookup = lookup_from(&[(ENV_SECRET_ID, "id"), (ENV_SECRET_KEY, "key")]);
		let config = ClientConfig::from_lookup(lookup).expect("Secrets should load.");

		assert_eq!(config.credentials.secret_id, "id");
		assert_eq!(config.credentials.secret_key.expose(), "key");
		assert_eq!(config.base_url.as_str(), "https://bankaccountdata.gocardless.com/");
		assert_eq!(config.request_timeout, ClientConfig::DEFAULT_TIMEOUT);
		assert_eq!(config.expiry_margin, Duration::ZERO);
	}

	#[test]
	fn from_lookup_reports_missing_secret() {
		let err = ClientConfig::from_lookup(lookup_from(&[(ENV_SECRET_ID, "id")]))
			.expect_err("Missing secret key should fail.");

		assert_eq!(err, ConfigError::MissingEnv { name: ENV_SECRET_KEY });

		let lookup = lookup_from(&[(ENV_SECRET_ID, ""), (ENV_SECRET_KEY, "k")]);
		let err = ClientConfig::from_lookup(lookup).expect_err("Empty secret id should fail.");

		assert_eq!(err, ConfigError::MissingEnv { name: ENV_SECRET_ID });
	}

	#[test]
	fn from_lookup_applies_overrides() {
		let config = ClientConfig::from_lookup(lookup_from(&[
			(ENV_SECRET_ID, "id"),
			(ENV_SECRET_KEY, "key"),
			(ENV_API_URL, "http://127.0.0.1:8080"),
			(ENV_TIMEOUT_SECS, "5"),
		]))
		.expect("Overrides should load.");

		assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
		assert_eq!(config.token_timeout, StdDuration::from_secs(5));
		assert_eq!(config.request_timeout, StdDuration::from_secs(5));

		let err = ClientConfig::from_lookup(lookup_from(&[
			(ENV_SECRET_ID, "id"),
			(ENV_SECRET_KEY, "key"),
			(ENV_TIMEOUT_SECS, "soon"),
		]))
		.expect_err("Non-numeric timeout should fail.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_TIMEOUT_SECS, .. }));
	}

	#[test]
	fn join_replaces_base_path_like_absolute_references() {
		let config = ClientConfig::builder(ClientCredentials::new("id", "key"))
			.base_url(Url::parse("https://bank.example.com/ignored/").expect("URL should parse."))
			.build()
			.expect("Config should build.");

		assert_eq!(
			config.token_url().expect("Token URL should join.").as_str(),
			"https://bank.example.com/api/v2/token/new/"
		);
		assert_eq!(
			config.join("/api/v2/institutions/?country=GB").expect("Path should join.").as_str(),
			"https://bank.example.com/api/v2/institutions/?country=GB"
		);
	}
}
