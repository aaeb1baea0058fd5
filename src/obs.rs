//! Observability helpers for token acquisition and data requests.
//!
//! # Feature Flags
//!
//! - Spans named `bankdata_broker.operation` carry the `operation` and `stage` fields and are
//!   always emitted through `tracing`.
//! - Enable `metrics` to increment the `bankdata_broker_operation_total` counter for every
//!   outcome, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Operations observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Access-token acquisition through the token provider.
	TokenAcquisition,
	/// Authenticated call against a data endpoint.
	DataRequest,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::TokenAcquisition => "token_acquisition",
			OperationKind::DataRequest => "data_request",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a broker helper.
	Attempt,
	/// Token served from cache.
	CacheHit,
	/// Caller attached to an in-flight acquisition.
	Joined,
	/// Successful completion.
	Success,
	/// Data endpoint answered 404.
	NotFound,
	/// Data endpoint answered with a body that is not JSON.
	ParseFailure,
	/// Data endpoint answered 429.
	RateLimited,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::CacheHit => "cache_hit",
			Outcome::Joined => "joined",
			Outcome::Success => "success",
			Outcome::NotFound => "not_found",
			Outcome::ParseFailure => "parse_failure",
			Outcome::RateLimited => "rate_limited",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
