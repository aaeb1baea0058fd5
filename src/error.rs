//! Broker-level error types shared across the token provider, request client, and config.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error exposed by public APIs.
///
/// Not-found and unparsable bodies are not errors; the request client reports them as
/// `Ok(None)`.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token issuance failed.
	#[error(transparent)]
	Auth(#[from] AuthError),

	/// Data endpoint answered with HTTP 429.
	#[error("Rate limit exceeded. {detail}")]
	RateLimited {
		/// Provider-supplied detail text (empty when the body carried none).
		detail: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Data endpoint failed with any other status, or the call never completed.
	#[error("{message}")]
	Provider {
		/// HTTP status code, absent for transport failures and timeouts.
		status: Option<u16>,
		/// Provider- or broker-supplied message summarizing the failure.
		message: String,
	},
}
impl Error {
	/// HTTP status a route handler should answer with for this error.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::RateLimited { .. } => 429,
			_ => 500,
		}
	}

	/// Returns `true` if the provider throttled the request.
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Self::RateLimited { .. })
	}

	pub(crate) fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
		Self::Provider { status, message: message.into() }
	}
}

/// Token issuance failure shared verbatim with every caller waiting on the same fetch.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct AuthError {
	/// Provider `detail` text when present, otherwise a broker-supplied description.
	pub message: String,
	/// HTTP status code returned by the token endpoint, when one was received.
	pub status: Option<u16>,
}
impl AuthError {
	/// Message used when the token endpoint fails without a `detail` field.
	pub const GENERIC_MESSAGE: &'static str = "Failed to obtain access token";

	/// Creates a new failure with the provided message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), status: None }
	}

	/// Attaches the HTTP status observed on the token endpoint.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` is invalid: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Offending raw value.
		value: String,
	},
	/// Client credentials contain an empty field.
	#[error("Client credential `{field}` must not be empty.")]
	EmptyCredential {
		/// Which credential field failed validation.
		field: &'static str,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than HTTP(S) or cannot carry paths.
	#[error("Base URL must be an http(s) URL that can carry paths: {url}.")]
	UnsupportedBaseUrl {
		/// URL that failed validation.
		url: String,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` cannot be joined onto the base URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
