//! Access-token acquisition with caching + a single-flight guard.
//!
//! [`TokenProvider::access_token`] serves the cached bearer token when it is still valid and
//! otherwise performs at most one network fetch at a time. The first caller that misses the
//! cache installs a shared acquisition future in the in-flight slot while holding the slot's
//! lock; callers arriving later clone that future instead of stampeding the token endpoint.
//! Every waiter observes the same outcome. The slot is cleared when the fetch settles, so a
//! failure is never cached and the next call retries.

mod issue;
mod metrics;

pub use metrics::AcquisitionMetrics;

// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::TokenCache,
	config::ClientConfig,
	error::AuthError,
	http::ReqwestHttpClient,
	obs::{self, OperationKind, OperationSpan, Outcome},
};

type Acquisition = Shared<BoxFuture<'static, Result<TokenSecret, AuthError>>>;
type InFlight = Arc<Mutex<Option<Acquisition>>>;

enum Entry {
	Cached(TokenSecret),
	Joined(Acquisition),
	Started(Acquisition),
}

/// Produces currently-valid access tokens for the bank-data provider.
///
/// Clones share the same cache, in-flight slot, and counters, so one provider constructed at
/// startup can be handed to every request handler.
#[derive(Clone)]
pub struct TokenProvider {
	http_client: ReqwestHttpClient,
	config: Arc<ClientConfig>,
	cache: Arc<TokenCache>,
	in_flight: InFlight,
	metrics: Arc<AcquisitionMetrics>,
}
impl TokenProvider {
	/// Creates a provider with its own empty cache.
	pub fn new(config: impl Into<Arc<ClientConfig>>, http_client: ReqwestHttpClient) -> Self {
		let config = config.into();
		let cache = Arc::new(TokenCache::new().with_margin(config.expiry_margin));

		Self::with_cache(config, http_client, cache)
	}

	/// Creates a provider backed by a caller-supplied cache.
	pub fn with_cache(
		config: impl Into<Arc<ClientConfig>>,
		http_client: ReqwestHttpClient,
		cache: Arc<TokenCache>,
	) -> Self {
		Self {
			http_client,
			config: config.into(),
			cache,
			in_flight: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Returns the cache this provider reads from and writes to.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Returns the shared acquisition counters.
	pub fn metrics(&self) -> &AcquisitionMetrics {
		&self.metrics
	}

	/// Drops the cached token so the next call fetches a new one.
	pub fn invalidate(&self) {
		self.cache.invalidate();
	}

	/// Returns `true` while a fetch against the token endpoint is outstanding.
	pub fn is_acquiring(&self) -> bool {
		self.in_flight.lock().is_some()
	}

	/// Returns a valid access token, fetching one when the cache is empty or expired.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		const KIND: OperationKind = OperationKind::TokenAcquisition;

		let span = OperationSpan::new(KIND, "access_token");

		obs::record_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(token) = self.cache.read() {
					self.metrics.record_cache_hit();
					obs::record_outcome(KIND, Outcome::CacheHit);
					tracing::debug!("Using cached access token.");

					return Ok(token);
				}

				let acquisition = match self.join_or_start() {
					Entry::Cached(token) => {
						self.metrics.record_cache_hit();
						obs::record_outcome(KIND, Outcome::CacheHit);

						return Ok(token);
					},
					Entry::Joined(acquisition) => {
						obs::record_outcome(KIND, Outcome::Joined);
						tracing::debug!("Joining in-flight access token acquisition.");

						acquisition
					},
					Entry::Started(acquisition) => {
						tracing::debug!("Fetching new access token.");

						acquisition
					},
				};

				acquisition.await.map_err(Error::from)
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_outcome(KIND, Outcome::Failure),
		}

		result
	}

	fn join_or_start(&self) -> Entry {
		let mut in_flight = self.in_flight.lock();

		// A fetch may have settled between the first cache read and taking the lock.
		if let Some(token) = self.cache.read() {
			return Entry::Cached(token);
		}
		if let Some(existing) = in_flight.as_ref() {
			self.metrics.record_join();

			return Entry::Joined(existing.clone());
		}

		let acquisition = self.fetch().boxed().shared();

		*in_flight = Some(acquisition.clone());

		Entry::Started(acquisition)
	}

	fn fetch(&self) -> impl Future<Output = Result<TokenSecret, AuthError>> + Send + use<> {
		let http_client = self.http_client.clone();
		let config = self.config.clone();
		let cache = self.cache.clone();
		let in_flight = self.in_flight.clone();
		let metrics = self.metrics.clone();

		metrics.record_fetch();

		async move {
			// Dropped after the cache write, and also when the fetch unwinds.
			let _slot = SlotReset(in_flight);

			match issue::request_token(&http_client, &config).await {
				Ok(issued) => {
					let credential = cache.store(issued.access, issued.access_expires);

					tracing::info!(
						expires_at = ?credential.expires_at,
						"New access token obtained."
					);

					Ok(credential.token)
				},
				Err(err) => {
					metrics.record_failure();
					tracing::error!(
						error = %err,
						status = ?err.status,
						"Failed to obtain access token."
					);

					Err(err)
				},
			}
		}
	}
}

/// Empties the in-flight slot when the owning acquisition settles or is torn down.
struct SlotReset(InFlight);
impl Drop for SlotReset {
	fn drop(&mut self) {
		self.0.lock().take();
	}
}

impl Debug for TokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("base_url", &self.config.base_url.as_str())
			.field("secret_id", &self.config.credentials.secret_id)
			.field("cached", &self.cache.current().is_some())
			.field("acquiring", &self.is_acquiring())
			.finish()
	}
}
