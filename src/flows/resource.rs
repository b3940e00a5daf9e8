//! Signed resource access against the protected service.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	error::ValidationError,
	flows::Consumer,
	http::{ResourceReply, SigningTransport},
	obs::{self, OperationSpan, Outcome},
	params::{EntropySource, Operation},
	signing::SigningKey,
};

impl<T, E> Consumer<T, E>
where
	T: ?Sized + SigningTransport,
	E: EntropySource,
{
	/// Executes an arbitrary signed call against the resource server.
	///
	/// `body` is sent form-encoded and participates in the signature. A 200 reply is
	/// returned as-is; any other status becomes [`Error::Authentication`] carrying the
	/// status, the `WWW-Authenticate` challenge when present, and the raw body; the
	/// body is always available to the caller on both paths.
	pub async fn access(
		&self,
		method: Method,
		token: &Token,
		path: &str,
		body: &[(String, String)],
	) -> Result<ResourceReply> {
		const KIND: Operation = Operation::Access;

		let span = OperationSpan::new(KIND, "access");

		obs::record_operation_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let access_token = token
					.oauth_token
					.as_deref()
					.filter(|value| !value.is_empty())
					.ok_or(ValidationError::MissingCredentials)?;
				let secret = token
					.oauth_token_secret
					.as_ref()
					.filter(|value| !value.is_empty())
					.map(TokenSecret::expose)
					.ok_or(ValidationError::MissingCredentials)?;
				let params = self.assembler().resource(access_token);
				let signing_key =
					SigningKey::assemble(&self.config.consumer_secret, Some(secret));
				let reply =
					self.transport.send(method, path, body, &params, &signing_key).await?;

				if reply.status != 200 {
					return Err(Error::Authentication {
						status: reply.status,
						challenge: reply.www_authenticate().map(str::to_owned),
						body: reply.body,
					});
				}

				Ok(reply)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, Outcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::Method;
	// self
	use crate::{
		_preludet::*,
		auth::{Token, TokenSecret},
		http::ResourceReply,
		provider::ConsumerConfig,
		signing::percent_encode,
	};

	fn access_token() -> Token {
		Token {
			oauth_token: Some("access".into()),
			oauth_token_secret: Some(TokenSecret::new("access secret")),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn successful_call_returns_the_raw_reply() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));

		transport.push_resource(ResourceReply::new(200, "profile-body"));

		let reply = consumer
			.access(Method::GET, &access_token(), "people/~", &[])
			.await
			.expect("Scripted resource call should succeed.");

		assert_eq!(reply.status, 200);
		assert_eq!(reply.body, "profile-body");
	}

	#[tokio::test]
	async fn verified_token_round_trips_into_the_signed_call() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));

		transport.push_resource(ResourceReply::new(200, ""));

		consumer
			.access(Method::GET, &access_token(), "people/~", &[])
			.await
			.expect("Scripted resource call should succeed.");

		let captured = transport.captured();
		let call = captured.first().expect("Transport should have captured one call.");

		assert_eq!(call.oauth.get("oauth_token"), Some("access"));
		assert!(call.signing_key.ends_with(&percent_encode("access secret")));
	}

	#[tokio::test]
	async fn non_200_status_surfaces_the_challenge_and_body() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));

		transport.push_resource(
			ResourceReply::new(401, "token rejected")
				.with_header("WWW-Authenticate", "OAuth realm=\"provider\""),
		);

		let err = consumer
			.access(Method::POST, &access_token(), "people/~", &[])
			.await
			.expect_err("Non-200 status should fail the call.");

		assert_eq!(err.to_string(), "Error 401: OAuth realm=\"provider\"");

		match err {
			Error::Authentication { status, challenge, body } => {
				assert_eq!(status, 401);
				assert_eq!(challenge.as_deref(), Some("OAuth realm=\"provider\""));
				assert_eq!(body, "token rejected");
			},
			other => panic!("Expected an authentication failure, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn empty_token_fails_locally_without_a_transport_call() {
		let (consumer, transport) = scripted_consumer(ConsumerConfig::new("key", "secret"));
		let err = consumer
			.access(Method::GET, &Token::default(), "people/~", &[])
			.await
			.expect_err("Empty token cannot sign a resource call.");

		assert!(matches!(err, Error::Validation(_)));
		assert_eq!(transport.calls(), 0);
	}
}
