//! Engine-level error types shared across flows, parameter assembly, and transports.

// self
use crate::{_prelude::*, params::Operation};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local validation failure detected before any transport call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider answered the exchange but returned no usable token.
	#[error("{message}")]
	Provider {
		/// Lifecycle operation that performed the exchange; context only, never behavior.
		operation: Operation,
		/// Display message following the `Unknown Error` / `Error {{status}}` rules.
		message: String,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Raw `oauth_problem` code, when the body carried one.
		problem: Option<String>,
	},
	/// Resource call came back with a non-200 status.
	#[error("Error {}{}", .status, .challenge.as_deref().map(|value| format!(": {value}")).unwrap_or_default())]
	Authentication {
		/// HTTP status code returned by the resource server.
		status: u16,
		/// `WWW-Authenticate` challenge, when the response carried one.
		challenge: Option<String>,
		/// Raw response body; always surfaced so callers can inspect it.
		body: String,
	},
}

/// Local validation failures raised before the engine touches the network.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Authorization callback named a different token than the pending one.
	#[error("Authorization callback returned a different oauth_token than the pending request token.")]
	TokenMismatch,
	/// Token lacks the credentials required to sign the call.
	#[error("Token is missing the oauth_token/oauth_token_secret pair required to sign this call.")]
	MissingCredentials,
	/// No verifier is available for the access-token exchange.
	#[error("Neither the callback nor the token carries an oauth_verifier.")]
	MissingVerifier,
}

/// Configuration and URL-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Endpoint path cannot be resolved against the provider base URL.
	#[error("Endpoint path `{path}` cannot be resolved against the provider base URL.")]
	InvalidEndpoint {
		/// Offending path string.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider returned an authorization URL that does not parse.
	#[error("Provider returned an invalid authorization URL.")]
	InvalidAuthorizeUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Signing key could not initialize the HMAC-SHA1 digest.
	#[error("Signing key could not initialize the HMAC-SHA1 digest.")]
	SigningKey {
		/// Underlying key-length failure.
		#[source]
		source: hmac::digest::InvalidLength,
	},
}

/// Transport-level failures (network, IO, body decoding).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Exchange body is not valid `application/x-www-form-urlencoded` data.
	#[error("Provider returned a token-exchange body that is not valid form encoding.")]
	BodyDecode {
		/// Structured decoding failure.
		#[source]
		source: serde::de::value::Error,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a plain message as a network failure.
	pub fn network_message(message: impl Into<BoxError>) -> Self {
		Self::Network { source: message.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
