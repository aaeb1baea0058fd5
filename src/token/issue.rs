//! Single call against the token-issuance endpoint.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	error::AuthError,
	http::{self, ReqwestHttpClient},
};

/// Fields of the issuance response the broker relies on; everything else is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct IssuedToken {
	pub(crate) access: TokenSecret,
	pub(crate) access_expires: i64,
}

/// Exchanges the configured credentials for a fresh access token.
pub(crate) async fn request_token(
	http_client: &ReqwestHttpClient,
	config: &ClientConfig,
) -> Result<IssuedToken, AuthError> {
	let url = config.token_url().map_err(|err| AuthError::new(err.to_string()))?;
	let request = http::no_cache_json(http_client.post(url))
		.timeout(config.token_timeout)
		.json(&config.credentials);
	let response = http_client.execute(request).await.map_err(map_transport_error)?;
	let status = response.status.as_u16();

	if !response.status.is_success() {
		let detail = serde_json::from_slice::<Value>(&response.body)
			.ok()
			.as_ref()
			.and_then(http::provider_detail);

		return Err(AuthError::new(detail.unwrap_or_else(|| AuthError::GENERIC_MESSAGE.into()))
			.with_status(status));
	}

	parse_issued_token(&response.body).map_err(|err| err.with_status(status))
}

pub(crate) fn parse_issued_token(body: &[u8]) -> Result<IssuedToken, AuthError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let issued: IssuedToken = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
		AuthError::new(format!("Token endpoint returned a malformed body: {err}"))
	})?;

	if issued.access.is_empty() {
		return Err(AuthError::new("Token endpoint returned an empty access token"));
	}
	if issued.access_expires <= 0 {
		return Err(AuthError::new(format!(
			"Token endpoint returned a non-positive lifetime: {}",
			issued.access_expires
		)));
	}
	if OffsetDateTime::now_utc().checked_add(Duration::seconds(issued.access_expires)).is_none() {
		return Err(AuthError::new(format!(
			"Token endpoint returned an out-of-range lifetime: {}",
			issued.access_expires
		)));
	}

	Ok(issued)
}

fn map_transport_error(err: ReqwestError) -> AuthError {
	if err.is_timeout() {
		AuthError::new("Timed out while calling the token endpoint")
	} else {
		AuthError::new(format!("Network error occurred while calling the token endpoint: {err}"))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_accepts_provider_body_and_ignores_extra_fields() {
		let body = br#"{"access":"tok_abc","access_expires":86400,"refresh":"r"}"#;
		let issued = parse_issued_token(body).expect("Provider body should parse.");

		assert_eq!(issued.access.expose(), "tok_abc");
		assert_eq!(issued.access_expires, 86400);
	}

	#[test]
	fn parse_reports_missing_fields_with_path() {
		let err = parse_issued_token(br#"{"access":"tok_abc"}"#)
			.expect_err("Body without lifetime should be rejected.");

		assert!(err.message.contains("access_expires"), "Unexpected message: {}", err.message);

		let err = parse_issued_token(br#"{"access":42,"access_expires":10}"#)
			.expect_err("Non-string token should be rejected.");

		assert!(err.message.contains("access"), "Unexpected message: {}", err.message);
	}

	#[test]
	fn parse_rejects_unusable_values() {
		assert!(parse_issued_token(br#"{"access":"","access_expires":10}"#).is_err());
		assert!(parse_issued_token(br#"{"access":"tok","access_expires":0}"#).is_err());
		assert!(parse_issued_token(b"<html>").is_err());
	}

	#[test]
	fn parse_rejects_lifetimes_past_the_calendar() {
		let err = parse_issued_token(br#"{"access":"tok","access_expires":9000000000000}"#)
			.expect_err("Lifetime beyond the representable range should be rejected.");

		assert!(err.message.contains("out-of-range"), "Unexpected message: {}", err.message);
		assert!(parse_issued_token(br#"{"access":"tok","access_expires":315360000}"#).is_ok());
	}
}
