//! Secret pair exchanged for access tokens at the token-issuance endpoint.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// `secret_id` + `secret_key` pair issued by the bank-data provider's user portal.
///
/// The struct serializes into the exact body the token endpoint expects:
/// `{"secret_id": "...", "secret_key": "..."}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ClientCredentials {
	/// Public secret identifier.
	pub secret_id: String,
	/// Secret key; redacted from `Debug` output.
	pub secret_key: TokenSecret,
}
impl ClientCredentials {
	/// Creates a credential pair.
	pub fn new(secret_id: impl Into<String>, secret_key: impl Into<TokenSecret>) -> Self {
		Self { secret_id: secret_id.into(), secret_key: secret_key.into() }
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		if self.secret_id.trim().is_empty() {
			return Err(ConfigError::EmptyCredential { field: "secret_id" });
		}
		if self.secret_key.expose().trim().is_empty() {
			return Err(ConfigError::EmptyCredential { field: "secret_key" });
		}

		Ok(())
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("secret_id", &self.secret_id)
			.field("secret_key", &self.secret_key)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_serialize_into_token_request_body() {
		let body = serde_json::to_value(ClientCredentials::new("id-1", "key-1"))
			.expect("Credentials should serialize to JSON.");

		assert_eq!(body, serde_json::json!({ "secret_id": "id-1", "secret_key": "key-1" }));
	}

	#[test]
	fn credentials_debug_hides_key() {
		let rendered = format!("{:?}", ClientCredentials::new("id-1", "key-1"));

		assert!(rendered.contains("id-1"));
		assert!(!rendered.contains("key-1"));
	}

	#[test]
	fn validate_rejects_blank_fields() {
		assert_eq!(
			ClientCredentials::new(" ", "key").validate(),
			Err(ConfigError::EmptyCredential { field: "secret_id" })
		);
		assert_eq!(
			ClientCredentials::new("id", "").validate(),
			Err(ConfigError::EmptyCredential { field: "secret_key" })
		);
		assert!(ClientCredentials::new("id", "key").validate().is_ok());
	}
}
