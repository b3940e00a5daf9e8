//! Caller-owned token mapping evolved by the lifecycle operations.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Caller-owned OAuth 1.0a token mapping.
///
/// The engine never stores tokens; every operation borrows the caller's value and a
/// successful exchange returns the replacement. Conceptually a token is *empty* (no
/// `oauth_token`), *pending* (request token issued, awaiting authorization) or *active*
/// (usable for signed resource access); the distinction is derived from field presence,
/// never stored, because OAuth 1.0a defines no token-introspection endpoint.
///
/// Serialized field names match the wire protocol (`oauth_token`, `oauth_token_secret`,
/// `oauth_verifier`, `oauth_session_handle`) plus the derived `expires` / `auth_expires`
/// Unix timestamps, so callers can persist the value as-is. Any other provider-returned
/// fields ride along in the flattened extra mapping.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Identity of the current request or access token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub oauth_token: Option<String>,
	/// Secret paired with [`oauth_token`](Self::oauth_token).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub oauth_token_secret: Option<TokenSecret>,
	/// One-time code, present transiently between authorization and verification.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub oauth_verifier: Option<String>,
	/// Provider-issued handle enabling refresh without re-authorization.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub oauth_session_handle: Option<String>,
	/// Absolute expiry derived from the provider's `oauth_expires_in`; absent means
	/// non-expiring.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "time::serde::timestamp::option"
	)]
	pub expires: Option<OffsetDateTime>,
	/// Absolute re-authorization deadline derived from the provider's
	/// `oauth_authorization_expires_in`.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "time::serde::timestamp::option"
	)]
	pub auth_expires: Option<OffsetDateTime>,
	/// Every other field the provider returned, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, String>,
}
impl Token {
	/// Returns `true` when no token identity is present at all.
	pub fn is_empty(&self) -> bool {
		!self.has_token()
	}

	/// Heuristic access check at the provided instant.
	///
	/// False when either credential field is missing or empty, or when `auth_expires`
	/// is strictly in the past. OAuth 1.0a has no introspection call, so a `true` here
	/// is a local judgment, not a provider guarantee.
	pub fn has_access_at(&self, instant: OffsetDateTime) -> bool {
		if !self.has_token() || !self.has_token_secret() {
			return false;
		}

		match self.auth_expires {
			Some(deadline) => deadline >= instant,
			None => true,
		}
	}

	/// Overlays provider-returned fields onto this mapping, keeping anything the
	/// replacement does not mention.
	pub fn merge(&mut self, replacement: Token) {
		let Token {
			oauth_token,
			oauth_token_secret,
			oauth_verifier,
			oauth_session_handle,
			expires,
			auth_expires,
			extra,
		} = replacement;

		if oauth_token.is_some() {
			self.oauth_token = oauth_token;
		}
		if oauth_token_secret.is_some() {
			self.oauth_token_secret = oauth_token_secret;
		}
		if oauth_verifier.is_some() {
			self.oauth_verifier = oauth_verifier;
		}
		if oauth_session_handle.is_some() {
			self.oauth_session_handle = oauth_session_handle;
		}
		if expires.is_some() {
			self.expires = expires;
		}
		if auth_expires.is_some() {
			self.auth_expires = auth_expires;
		}

		self.extra.extend(extra);
	}

	fn has_token(&self) -> bool {
		self.oauth_token.as_deref().is_some_and(|value| !value.is_empty())
	}

	fn has_token_secret(&self) -> bool {
		self.oauth_token_secret.as_ref().is_some_and(|value| !value.is_empty())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("oauth_token", &self.oauth_token)
			.field("oauth_token_secret", &self.oauth_token_secret.as_ref().map(|_| "<redacted>"))
			.field("oauth_verifier", &self.oauth_verifier)
			.field("oauth_session_handle", &self.oauth_session_handle)
			.field("expires", &self.expires)
			.field("auth_expires", &self.auth_expires)
			.field("extra", &self.extra)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn active_token() -> Token {
		Token {
			oauth_token: Some("token".into()),
			oauth_token_secret: Some(TokenSecret::new("secret")),
			..Default::default()
		}
	}

	#[test]
	fn access_requires_both_credential_fields() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);

		assert!(active_token().has_access_at(now));
		assert!(!active_token().is_empty());
		assert!(Token::default().is_empty());
		assert!(!Token::default().has_access_at(now));

		let no_secret = Token { oauth_token_secret: None, ..active_token() };

		assert!(!no_secret.has_access_at(now));

		let empty_secret =
			Token { oauth_token_secret: Some(TokenSecret::new("")), ..active_token() };

		assert!(!empty_secret.has_access_at(now));

		let empty_token = Token { oauth_token: Some(String::new()), ..active_token() };

		assert!(!empty_token.has_access_at(now));
	}

	#[test]
	fn access_denied_only_when_auth_expiry_strictly_past() {
		let deadline = macros::datetime!(2025-06-01 12:00 UTC);
		let token = Token { auth_expires: Some(deadline), ..active_token() };

		assert!(token.has_access_at(deadline - Duration::seconds(1)));
		assert!(token.has_access_at(deadline));
		assert!(!token.has_access_at(deadline + Duration::seconds(1)));
	}

	#[test]
	fn expiry_is_ignored_by_the_access_heuristic() {
		let past = macros::datetime!(2025-01-01 00:00 UTC);
		let token = Token { expires: Some(past), ..active_token() };

		// `expires` governs refresh pressure, not authorization validity.
		assert!(token.has_access_at(macros::datetime!(2025-06-01 12:00 UTC)));
	}

	#[test]
	fn merge_overlays_without_dropping_prior_fields() {
		let mut token = active_token();

		token.extra.insert("xoauth_scope".into(), "read".into());

		let replacement = Token {
			oauth_token: Some("renewed".into()),
			oauth_session_handle: Some("handle".into()),
			..Default::default()
		};

		token.merge(replacement);

		assert_eq!(token.oauth_token.as_deref(), Some("renewed"));
		assert_eq!(token.oauth_token_secret.as_ref().map(TokenSecret::expose), Some("secret"));
		assert_eq!(token.oauth_session_handle.as_deref(), Some("handle"));
		assert_eq!(token.extra.get("xoauth_scope").map(String::as_str), Some("read"));
	}
}
