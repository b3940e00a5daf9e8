//! Signing-key composition and the OAuth percent-encoding rule.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::_prelude::*;

/// Everything outside the RFC 3986 unreserved set
/// (`ALPHA / DIGIT / "-" / "." / "_" / "~"`) is percent-encoded.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a string per the OAuth/RFC 3986 unreserved-character rule.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Secret material used to compute the HMAC-SHA1 signature over a request.
///
/// Redacts itself in `Debug`/`Display`; transports read the raw key via
/// [`expose`](Self::expose).
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);
impl SigningKey {
	/// Composes the signing key: percent-encoded consumer secret, a literal `&`, and,
	/// once a token secret exists (verify, refresh, resource access), the
	/// percent-encoded token secret. Request-token keys end with the bare `&`.
	pub fn assemble(consumer_secret: &str, token_secret: Option<&str>) -> Self {
		Self(format!(
			"{}&{}",
			percent_encode(consumer_secret),
			token_secret.map(percent_encode).unwrap_or_default()
		))
	}

	/// Returns the raw key string. Callers must avoid logging this value.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}
impl Display for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unreserved_characters_pass_through() {
		assert_eq!(percent_encode("test-value_123.txt"), "test-value_123.txt");
		assert_eq!(percent_encode("~tilde"), "~tilde");
	}

	#[test]
	fn reserved_characters_are_encoded() {
		assert_eq!(percent_encode("hello world"), "hello%20world");
		assert_eq!(percent_encode("foo=bar&baz"), "foo%3Dbar%26baz");
		assert_eq!(percent_encode("a+b/c"), "a%2Bb%2Fc");
	}

	#[test]
	fn request_key_ends_with_the_bare_separator() {
		let key = SigningKey::assemble("consumer&secret", None);

		assert_eq!(key.expose(), "consumer%26secret&");
	}

	#[test]
	fn exchange_key_appends_the_encoded_token_secret() {
		let key = SigningKey::assemble("consumer secret", Some("token secret"));

		assert_eq!(key.expose(), "consumer%20secret&token%20secret");
	}

	#[test]
	fn key_formatters_redact() {
		let key = SigningKey::assemble("secret", None);

		assert_eq!(format!("{key:?}"), "SigningKey(\"<redacted>\")");
		assert_eq!(format!("{key}"), "<redacted>");
	}
}
