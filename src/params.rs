//! OAuth protocol parameter assembly.
//!
//! Every operation rebuilds its `oauth_*` parameter set from scratch; nothing is cached
//! or reused between calls. Empty values are dropped before the set ever reaches a
//! transport, because the wire format never transmits empty `oauth_*` parameters.

// std
use std::fmt::Write as _;
// crates.io
use rand::Rng;
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const PROTOCOL_VERSION: &str = "1.0";

/// Lifecycle operations the engine performs against a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Request-token acquisition.
	Request,
	/// Verifier-based access-token exchange.
	Verify,
	/// Session refresh against the access-token endpoint.
	Refresh,
	/// Signed resource call.
	Access,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Request => "request",
			Operation::Verify => "verify",
			Operation::Refresh => "refresh",
			Operation::Access => "access",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Clock and randomness seam behind nonce/timestamp generation.
///
/// The production implementation is [`SystemEntropy`]; tests inject fixed values so
/// exact parameter sets can be asserted.
pub trait EntropySource: Send + Sync {
	/// Current instant; stamped into every parameter set.
	fn now(&self) -> OffsetDateTime;

	/// Random value mixed into generated nonces.
	fn random(&self) -> u64;
}

/// [`EntropySource`] backed by the system clock and thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEntropy;
impl EntropySource for SystemEntropy {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn random(&self) -> u64 {
		rand::rng().random()
	}
}

/// Order-irrelevant `oauth_*` parameter mapping with empty values dropped on insert.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSet(BTreeMap<String, String>);
impl ParameterSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a parameter, silently dropping empty values.
	pub fn set(&mut self, key: &str, value: impl Into<String>) {
		let value = value.into();

		if value.is_empty() {
			return;
		}

		self.0.insert(key.to_owned(), value);
	}

	/// Looks up a parameter value.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns `true` when the parameter is present.
	pub fn contains(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of parameters in the set.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no parameters are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates parameters in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}
}

/// Builds the `oauth_*` parameter set required by each lifecycle operation.
#[derive(Clone, Debug)]
pub struct ParameterAssembler<'a, E>
where
	E: EntropySource,
{
	consumer_key: &'a str,
	entropy: &'a E,
}
impl<'a, E> ParameterAssembler<'a, E>
where
	E: EntropySource,
{
	/// Creates an assembler for the given consumer identity.
	pub fn new(consumer_key: &'a str, entropy: &'a E) -> Self {
		Self { consumer_key, entropy }
	}

	/// Parameters for the request-token exchange.
	///
	/// The nonce is caller-supplied when the request spec carries one, generated
	/// otherwise; `xoauth_lang_pref` rides along when a language preference is set.
	pub fn request_token(
		&self,
		callback: &str,
		nonce: Option<&str>,
		lang: Option<&str>,
	) -> ParameterSet {
		let mut set = self.base();

		set.set("oauth_callback", callback);

		if let Some(nonce) = nonce {
			set.set("oauth_nonce", nonce);
		}
		if let Some(lang) = lang {
			set.set("xoauth_lang_pref", lang);
		}

		set
	}

	/// Parameters for the verifier-based access-token exchange.
	pub fn verify(&self, token: &str, verifier: &str) -> ParameterSet {
		let mut set = self.base();

		set.set("oauth_token", token);
		set.set("oauth_verifier", verifier);

		set
	}

	/// Parameters for the session-refresh exchange.
	pub fn refresh(&self, token: &str, session_handle: Option<&str>) -> ParameterSet {
		let mut set = self.base();

		set.set("oauth_token", token);

		if let Some(handle) = session_handle {
			set.set("oauth_session_handle", handle);
		}

		set
	}

	/// Parameters for a signed resource call.
	pub fn resource(&self, token: &str) -> ParameterSet {
		let mut set = self.base();

		set.set("oauth_token", token);

		set
	}

	/// Generates a best-effort-unique nonce: a hex SHA-256 digest over the current
	/// time and a random value. Collisions are accepted as negligible; no replay
	/// bookkeeping is performed.
	pub fn nonce(&self) -> String {
		let seed = format!(
			"{}{}",
			self.entropy.now().unix_timestamp_nanos(),
			self.entropy.random()
		);
		let digest = Sha256::digest(seed.as_bytes());

		digest.iter().fold(String::with_capacity(64), |mut out, byte| {
			let _ = write!(out, "{byte:02x}");

			out
		})
	}

	fn base(&self) -> ParameterSet {
		let mut set = ParameterSet::new();

		set.set("oauth_consumer_key", self.consumer_key);
		set.set("oauth_nonce", self.nonce());
		set.set("oauth_signature_method", SIGNATURE_METHOD);
		set.set("oauth_timestamp", self.entropy.now().unix_timestamp().to_string());
		set.set("oauth_version", PROTOCOL_VERSION);

		set
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::FixedEntropy;

	fn assembler(entropy: &FixedEntropy) -> ParameterAssembler<'_, FixedEntropy> {
		ParameterAssembler::new("consumer-key", entropy)
	}

	#[test]
	fn empty_values_never_enter_the_set() {
		let mut set = ParameterSet::new();

		set.set("oauth_callback", "");
		set.set("oauth_token", "value");

		assert!(!set.contains("oauth_callback"));
		assert_eq!(set.get("oauth_token"), Some("value"));
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn request_token_set_matches_the_operation_table() {
		let entropy = FixedEntropy::default();
		let set = assembler(&entropy).request_token(
			"https://consumer.test/callback",
			Some("caller-nonce"),
			Some("en-us"),
		);

		assert_eq!(set.get("oauth_consumer_key"), Some("consumer-key"));
		assert_eq!(set.get("oauth_callback"), Some("https://consumer.test/callback"));
		assert_eq!(set.get("oauth_nonce"), Some("caller-nonce"));
		assert_eq!(set.get("oauth_signature_method"), Some("HMAC-SHA1"));
		assert_eq!(
			set.get("oauth_timestamp"),
			Some(entropy.at.unix_timestamp().to_string().as_str())
		);
		assert_eq!(set.get("oauth_version"), Some("1.0"));
		assert_eq!(set.get("xoauth_lang_pref"), Some("en-us"));
		assert_eq!(set.len(), 7);
	}

	#[test]
	fn verify_set_carries_token_and_verifier() {
		let entropy = FixedEntropy::default();
		let set = assembler(&entropy).verify("pending-token", "verifier-code");

		assert_eq!(set.get("oauth_token"), Some("pending-token"));
		assert_eq!(set.get("oauth_verifier"), Some("verifier-code"));
		assert!(set.contains("oauth_nonce"));
		assert!(!set.contains("oauth_callback"));
		assert_eq!(set.len(), 7);
	}

	#[test]
	fn refresh_set_includes_session_handle_only_when_present() {
		let entropy = FixedEntropy::default();
		let with_handle = assembler(&entropy).refresh("token", Some("handle"));
		let without = assembler(&entropy).refresh("token", None);

		assert_eq!(with_handle.get("oauth_session_handle"), Some("handle"));
		assert!(!with_handle.contains("oauth_verifier"));
		assert!(!without.contains("oauth_session_handle"));
		assert_eq!(without.len(), 6);
	}

	#[test]
	fn resource_set_is_the_minimal_signed_surface() {
		let entropy = FixedEntropy::default();
		let set = assembler(&entropy).resource("access-token");

		assert_eq!(set.get("oauth_token"), Some("access-token"));
		assert!(!set.contains("oauth_verifier"));
		assert!(!set.contains("oauth_session_handle"));
		assert!(!set.contains("oauth_callback"));
		assert_eq!(set.len(), 6);
	}

	#[test]
	fn generated_nonce_is_a_stable_hex_digest_under_fixed_entropy() {
		let entropy = FixedEntropy::default();
		let assembler = assembler(&entropy);
		let nonce = assembler.nonce();

		assert_eq!(nonce.len(), 64);
		assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
		assert_eq!(nonce, assembler.nonce());
	}
}
