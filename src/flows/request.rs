//! Request-token acquisition and the end-user authorization hand-off.

// self
use crate::{
	_prelude::*,
	auth::Token,
	error::ConfigError,
	flows::Consumer,
	http::{Endpoint, SigningTransport},
	obs::{self, OperationSpan, Outcome},
	params::{EntropySource, Operation},
	response,
	signing::SigningKey,
};

/// Ephemeral description of a pending authorization request; consumed once by
/// [`Consumer::request`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestSpec {
	/// Callback URL the provider redirects the end user back to.
	pub callback: String,
	/// Caller-supplied nonce; generated when absent.
	pub nonce: Option<String>,
	/// Language preference forwarded as `xoauth_lang_pref`.
	pub lang: Option<String>,
}
impl RequestSpec {
	/// Creates a spec for the given callback URL.
	pub fn new(callback: impl Into<String>) -> Self {
		Self { callback: callback.into(), nonce: None, lang: None }
	}

	/// Supplies an explicit nonce instead of a generated one.
	pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = Some(nonce.into());

		self
	}

	/// Sets the end-user language preference.
	pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = Some(lang.into());

		self
	}
}

/// Successful request-token exchange: the replacement token plus the URL the end user
/// must visit to authorize it.
#[derive(Clone, Debug)]
pub struct Authorization {
	/// Caller token overlaid with the provider's request token fields.
	pub token: Token,
	/// Provider interaction URL to surface to the end user.
	pub authorize_url: Url,
}

impl<T, E> Consumer<T, E>
where
	T: ?Sized + SigningTransport,
	E: EntropySource,
{
	/// Obtains a request token and the authorize URL for the end-user hand-off.
	///
	/// The signing key is consumer-secret-only, since no token secret exists yet. When the
	/// provider's reply carries a direct interaction URL (`xoauth_request_auth_url`)
	/// that URL wins; otherwise the authorize endpoint is materialized with the new
	/// `oauth_token` appended. On failure the caller's token is untouched.
	pub async fn request(&self, token: &Token, spec: RequestSpec) -> Result<Authorization> {
		const KIND: Operation = Operation::Request;

		let span = OperationSpan::new(KIND, "request");

		obs::record_operation_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let params = self.assembler().request_token(
					&spec.callback,
					spec.nonce.as_deref(),
					spec.lang.as_deref(),
				);
				let signing_key = SigningKey::assemble(&self.config.consumer_secret, None);
				let reply =
					self.transport.post(Endpoint::RequestToken, &params, &signing_key).await?;
				let fresh = response::interpret_exchange(KIND, &reply, self.now())?;
				let mut next = token.clone();

				next.merge(fresh);

				let authorize_url = match next.extra.get("xoauth_request_auth_url") {
					Some(direct) => Url::parse(direct)
						.map_err(|source| ConfigError::InvalidAuthorizeUrl { source })?,
					None => {
						let query = [(
							"oauth_token".to_owned(),
							next.oauth_token.clone().unwrap_or_default(),
						)];

						self.transport.url(Endpoint::Authorize, &query)?
					},
				};

				Ok(Authorization { token: next, authorize_url })
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, Outcome::Failure),
		}

		result
	}
}
