//! Thread-safe single-slot cache for the shared bearer credential.
//!
//! [`TokenCache`] holds zero or one [`CachedCredential`]. Expiry is detected lazily: a read
//! that finds an expired credential clears the slot and reports a miss, so later reads do not
//! re-check the same dead entry. Every operation has an `_at` variant taking an explicit
//! instant so expiry can be tested without sleeping.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer credential plus the absolute instant it stops being usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedCredential {
	/// Bearer token returned by the issuance endpoint.
	pub token: TokenSecret,
	/// Issued-at instant plus the server-declared lifetime.
	pub expires_at: OffsetDateTime,
}
impl CachedCredential {
	/// Returns `true` while `instant < expires_at - margin`.
	///
	/// A margin reaching past the earliest representable instant counts as expired.
	pub fn is_valid_at(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		self.expires_at.checked_sub(margin).is_some_and(|deadline| instant < deadline)
	}
}

/// Process-wide store for the single shared credential.
#[derive(Debug, Default)]
pub struct TokenCache {
	slot: RwLock<Option<CachedCredential>>,
	margin: Duration,
}
impl TokenCache {
	/// Creates an empty cache with exact expiry semantics.
	pub fn new() -> Self {
		Self::default()
	}

	/// Treats credentials as expired `margin` before their declared expiry.
	pub fn with_margin(mut self, margin: Duration) -> Self {
		self.margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Safety margin applied when checking validity.
	pub fn margin(&self) -> Duration {
		self.margin
	}

	/// Replaces any existing credential with `token`, valid for `lifetime_secs` from now.
	pub fn store(&self, token: TokenSecret, lifetime_secs: i64) -> CachedCredential {
		self.store_at(token, lifetime_secs, OffsetDateTime::now_utc())
	}

	/// Replaces any existing credential, computing expiry relative to `now`.
	///
	/// Expiry saturates at the bounds of the calendar.
	pub fn store_at(
		&self,
		token: TokenSecret,
		lifetime_secs: i64,
		now: OffsetDateTime,
	) -> CachedCredential {
		let expires_at = now.saturating_add(Duration::seconds(lifetime_secs));
		let credential = CachedCredential { token, expires_at };

		*self.slot.write() = Some(credential.clone());

		credential
	}

	/// Returns the token if it is still valid, clearing the slot when it has expired.
	pub fn read(&self) -> Option<TokenSecret> {
		self.read_at(OffsetDateTime::now_utc())
	}

	/// Returns the token if it is valid at `now`, clearing the slot when it is not.
	pub fn read_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		{
			let guard = self.slot.read();

			match guard.as_ref() {
				None => return None,
				Some(credential) if credential.is_valid_at(now, self.margin) =>
					return Some(credential.token.clone()),
				Some(_) => {},
			}
		}

		let mut guard = self.slot.write();

		// Another reader may have stored a fresh credential between the two locks.
		match guard.as_ref() {
			Some(credential) if credential.is_valid_at(now, self.margin) =>
				Some(credential.token.clone()),
			_ => {
				*guard = None;

				None
			},
		}
	}

	/// Returns the stored credential without checking or clearing it.
	pub fn current(&self) -> Option<CachedCredential> {
		self.slot.read().clone()
	}

	/// Drops the stored credential so the next read misses.
	pub fn invalidate(&self) {
		self.slot.write().take();
	}
}
