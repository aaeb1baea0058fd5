//! Transport primitives shared by the token provider and the request client.
//!
//! Both components issue their calls through [`ReqwestHttpClient`] and read the status,
//! `Retry-After` hint, and raw body back as a [`RawResponse`], so status classification
//! happens in one place per component instead of inside reqwest callbacks.

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	RequestBuilder,
	header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, EXPIRES, HeaderMap, PRAGMA, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Captures header metadata from an HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Fully-buffered HTTP response.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// Response status.
	pub status: StatusCode,
	/// Retry metadata.
	pub metadata: ResponseMetadata,
	/// Raw body bytes.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Clones share the same connection pool; the token provider and the request client of a
/// single broker hold clones of one wrapper.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Sends `request` and buffers the response body.
	pub(crate) async fn execute(
		&self,
		request: RequestBuilder,
	) -> Result<RawResponse, ReqwestError> {
		let response = request.send().await?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let metadata = ResponseMetadata { retry_after };
		let body = response.bytes().await?.to_vec();

		Ok(RawResponse { status, metadata, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Applies JSON content negotiation and cache-busting directives.
///
/// The provider serves stale payloads when intermediaries are allowed to cache.
pub(crate) fn no_cache_json(request: RequestBuilder) -> RequestBuilder {
	request
		.header(ACCEPT, "application/json")
		.header(CONTENT_TYPE, "application/json")
		.header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
		.header(PRAGMA, "no-cache")
		.header(EXPIRES, "0")
}

/// Extracts a human-readable message from a provider error body.
///
/// The provider reports failures as `{"detail": ...}` and sometimes `{"summary": ...}`.
pub(crate) fn provider_detail(body: &Value) -> Option<String> {
	["detail", "summary"]
		.into_iter()
		.filter_map(|field| body.get(field).and_then(Value::as_str))
		.map(str::trim)
		.find(|text| !text.is_empty())
		.map(str::to_owned)
}

pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
