//! Access-token exchanges: the verifier-based upgrade and session refresh.
//!
//! OAuth 1.0a has a single token endpoint serving both exchanges; the two operations
//! differ only in which parameters ride along (`oauth_verifier` for verification,
//! `oauth_session_handle` for refresh).

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	error::ValidationError,
	flows::Consumer,
	http::{Endpoint, SigningTransport},
	obs::{self, OperationSpan, Outcome},
	params::{EntropySource, Operation},
	response,
	signing::SigningKey,
};

/// Parameters the user agent carried back from the provider's authorize redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
	/// Token named by the redirect; validated against the pending token when present.
	pub oauth_token: Option<String>,
	/// One-time verifier issued after the end user approved the request.
	pub oauth_verifier: Option<String>,
}
impl CallbackQuery {
	/// Creates an empty callback query.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the token echoed by the user agent.
	pub fn with_token(mut self, token: impl Into<String>) -> Self {
		self.oauth_token = Some(token.into());

		self
	}

	/// Sets the verifier returned by the provider.
	pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
		self.oauth_verifier = Some(verifier.into());

		self
	}
}

impl<T, E> Consumer<T, E>
where
	T: ?Sized + SigningTransport,
	E: EntropySource,
{
	/// Exchanges an authorized request token for an access token.
	///
	/// When the callback names a token that differs from the pending one, the call
	/// fails locally with [`ValidationError::TokenMismatch`]; no transport call is
	/// issued. On success the returned [`Token`] replaces the caller's entirely; on
	/// failure the pending token survives for a caller-driven retry.
	pub async fn verify(&self, token: &Token, callback: &CallbackQuery) -> Result<Token> {
		const KIND: Operation = Operation::Verify;

		let span = OperationSpan::new(KIND, "verify");

		obs::record_operation_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let mismatch = callback
					.oauth_token
					.as_deref()
					.is_some_and(|returned| token.oauth_token.as_deref() != Some(returned));

				if mismatch {
					return Err(ValidationError::TokenMismatch.into());
				}

				let (pending, secret) = pending_credentials(token)?;
				let verifier = callback
					.oauth_verifier
					.as_deref()
					.or(token.oauth_verifier.as_deref())
					.filter(|value| !value.is_empty())
					.ok_or(ValidationError::MissingVerifier)?;
				let params = self.assembler().verify(pending, verifier);
				let signing_key =
					SigningKey::assemble(&self.config.consumer_secret, Some(secret));
				let reply =
					self.transport.post(Endpoint::AccessToken, &params, &signing_key).await?;

				response::interpret_exchange(KIND, &reply, self.now())
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, Outcome::Failure),
		}

		result
	}

	/// Renews an active token's session without re-authorization.
	///
	/// Same endpoint as [`verify`](Self::verify), no verifier; the token's
	/// `oauth_session_handle` rides along when present. The caller must serialize
	/// concurrent refreshes of the same token.
	pub async fn refresh(&self, token: &Token) -> Result<Token> {
		const KIND: Operation = Operation::Refresh;

		let span = OperationSpan::new(KIND, "refresh");

		obs::record_operation_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let (current, secret) = pending_credentials(token)?;
				let params =
					self.assembler().refresh(current, token.oauth_session_handle.as_deref());
				let signing_key =
					SigningKey::assemble(&self.config.consumer_secret, Some(secret));
				let reply =
					self.transport.post(Endpoint::AccessToken, &params, &signing_key).await?;

				response::interpret_exchange(KIND, &reply, self.now())
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, Outcome::Failure),
		}

		result
	}
}

fn pending_credentials(token: &Token) -> Result<(&str, &str)> {
	let current = token.oauth_token.as_deref().filter(|value| !value.is_empty());
	let secret = token
		.oauth_token_secret
		.as_ref()
		.filter(|value| !value.is_empty())
		.map(TokenSecret::expose);

	match (current, secret) {
		(Some(current), Some(secret)) => Ok((current, secret)),
		_ => Err(ValidationError::MissingCredentials.into()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::CallbackQuery;
	use crate::{
		_preludet::*,
		auth::{Token, TokenSecret},
		error::ValidationError,
		http::ExchangeReply,
		provider::ConsumerConfig,
	};

	fn pending_token() -> Token {
		Token {
			oauth_token: Some("pending".into()),
			oauth_token_secret: Some(TokenSecret::new("pending-secret")),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn mismatched_callback_token_fails_before_any_transport_call() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));
		let callback = CallbackQuery::new().with_token("somebody-else").with_verifier("v");
		let err = consumer
			.verify(&pending_token(), &callback)
			.await
			.expect_err("Mismatched token should fail locally.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::TokenMismatch)
		));
		assert_eq!(transport.calls(), 0);
	}

	#[tokio::test]
	async fn verify_replaces_the_token_with_the_provider_reply() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));

		transport.push_exchange(
			ExchangeReply::new(200)
				.with_field("oauth_token", "access")
				.with_field("oauth_token_secret", "access-secret")
				.with_field("oauth_session_handle", "handle"),
		);

		let callback = CallbackQuery::new().with_token("pending").with_verifier("verifier-code");
		let replacement = consumer
			.verify(&pending_token(), &callback)
			.await
			.expect("Scripted verify exchange should succeed.");

		assert_eq!(replacement.oauth_token.as_deref(), Some("access"));
		assert_eq!(
			replacement.oauth_token_secret.as_ref().map(TokenSecret::expose),
			Some("access-secret")
		);
		assert_eq!(replacement.oauth_session_handle.as_deref(), Some("handle"));

		let captured = transport.captured();
		let call = captured.first().expect("Transport should have captured one call.");

		assert_eq!(call.oauth.get("oauth_token"), Some("pending"));
		assert_eq!(call.oauth.get("oauth_verifier"), Some("verifier-code"));
		assert_eq!(call.signing_key, "secret&pending-secret");
	}

	#[tokio::test]
	async fn verify_falls_back_to_the_verifier_stored_on_the_token() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));

		transport.push_exchange(ExchangeReply::new(200).with_field("oauth_token", "access"));

		let token = Token { oauth_verifier: Some("stored".into()), ..pending_token() };

		consumer
			.verify(&token, &CallbackQuery::new())
			.await
			.expect("Verifier stored on the token should be used.");

		let captured = transport.captured();
		let call = captured.first().expect("Transport should have captured one call.");

		assert_eq!(call.oauth.get("oauth_verifier"), Some("stored"));
	}

	#[tokio::test]
	async fn verify_without_any_verifier_fails_locally() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));
		let err = consumer
			.verify(&pending_token(), &CallbackQuery::new())
			.await
			.expect_err("Missing verifier should fail locally.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::MissingVerifier)
		));
		assert_eq!(transport.calls(), 0);
	}

	#[tokio::test]
	async fn refresh_derives_the_absolute_expiry_from_the_reply() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));

		transport.push_exchange(
			ExchangeReply::new(200)
				.with_field("oauth_token", "renewed")
				.with_field("oauth_token_secret", "renewed-secret")
				.with_field("oauth_expires_in", "3600"),
		);

		let token = Token { oauth_session_handle: Some("handle".into()), ..pending_token() };
		let replacement =
			consumer.refresh(&token).await.expect("Scripted refresh should succeed.");
		let now = FixedEntropy::default().at;

		assert_eq!(replacement.expires, Some(now + Duration::seconds(3600)));

		let captured = transport.captured();
		let call = captured.first().expect("Transport should have captured one call.");

		assert_eq!(call.oauth.get("oauth_session_handle"), Some("handle"));
		assert!(!call.oauth.contains("oauth_verifier"));
	}

	#[tokio::test]
	async fn refresh_of_an_empty_token_fails_locally() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));
		let err = consumer
			.refresh(&Token::default())
			.await
			.expect_err("Empty token cannot be refreshed.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::MissingCredentials)
		));
		assert_eq!(transport.calls(), 0);
	}
}
