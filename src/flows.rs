//! Token lifecycle orchestration for the OAuth 1.0a consumer.

pub mod exchange;
pub mod request;
pub mod resource;

pub use exchange::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::Token,
	http::SigningTransport,
	params::{EntropySource, ParameterAssembler, SystemEntropy},
	provider::ConsumerConfig,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestSigningTransport;

#[cfg(feature = "reqwest")]
/// Consumer specialized for the crate's default reqwest transport.
pub type ReqwestConsumer = Consumer<ReqwestSigningTransport>;

/// Drives the OAuth 1.0a token lifecycle against a single provider.
///
/// The consumer owns the signing transport, configuration, and entropy source so the
/// individual operations focus on protocol logic. It holds no per-token state, caches,
/// or locks: every operation borrows the caller's [`Token`] and returns a replacement
/// on success, leaving the prior value untouched on failure so retries reuse it.
/// Serializing concurrent refreshes of the *same* token is the caller's responsibility;
/// distinct tokens can be operated on concurrently without coordination.
#[derive(Clone)]
pub struct Consumer<T, E = SystemEntropy>
where
	T: ?Sized + SigningTransport,
	E: EntropySource,
{
	/// Transport used for every outbound provider call.
	pub transport: Arc<T>,
	/// Consumer credentials and endpoint paths.
	pub config: ConsumerConfig,
	entropy: E,
}
impl<T> Consumer<T>
where
	T: ?Sized + SigningTransport,
{
	/// Creates a consumer backed by the system clock and RNG.
	pub fn with_transport(config: ConsumerConfig, transport: impl Into<Arc<T>>) -> Self {
		Self::with_entropy(config, transport, SystemEntropy)
	}
}
impl<T, E> Consumer<T, E>
where
	T: ?Sized + SigningTransport,
	E: EntropySource,
{
	/// Creates a consumer with an explicit entropy source so tests can pin the clock
	/// and randomness.
	pub fn with_entropy(config: ConsumerConfig, transport: impl Into<Arc<T>>, entropy: E) -> Self {
		Self { transport: transport.into(), config, entropy }
	}

	/// Local heuristic access check; issues no transport call.
	///
	/// False when either credential field is missing/empty or when `auth_expires` has
	/// strictly passed. OAuth 1.0a defines no introspection endpoint, so `true` is a
	/// local judgment, not a provider guarantee.
	pub fn has_access(&self, token: &Token) -> bool {
		token.has_access_at(self.now())
	}

	/// Pure accessor for the token's absolute expiry; `None` means non-expiring.
	pub fn expires(&self, token: &Token) -> Option<OffsetDateTime> {
		token.expires
	}

	/// No-op release returning `true`; OAuth 1.0a defines no revocation endpoint.
	pub fn release(&self, _token: &Token) -> bool {
		true
	}

	pub(crate) fn assembler(&self) -> ParameterAssembler<'_, E> {
		ParameterAssembler::new(&self.config.consumer_key, &self.entropy)
	}

	pub(crate) fn now(&self) -> OffsetDateTime {
		self.entropy.now()
	}
}
#[cfg(feature = "reqwest")]
impl Consumer<ReqwestSigningTransport> {
	/// Creates a consumer with a bundled reqwest transport rooted at `base`.
	///
	/// Endpoint paths from the config resolve against `base` eagerly, so a broken
	/// path surfaces here rather than mid-flow.
	pub fn new(config: ConsumerConfig, base: Url) -> Result<Self> {
		let transport = ReqwestSigningTransport::new(base, &config.endpoints)?;

		Ok(Self::with_transport(config, transport))
	}
}
impl<T, E> Debug for Consumer<T, E>
where
	T: ?Sized + SigningTransport,
	E: EntropySource,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Consumer").field("config", &self.config).finish()
	}
}
