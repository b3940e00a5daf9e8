//! Consumer credentials and provider endpoint configuration.

// self
use crate::{_prelude::*, http::Endpoint};

/// Consumer-side configuration: application credentials plus endpoint path overrides.
///
/// Every field has a string default and absence is not an error: a config built from
/// `Default` is structurally valid, it just will not authenticate against anything.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerConfig {
	/// Provider-assigned application identifier.
	#[serde(default)]
	pub consumer_app_id: String,
	/// OAuth consumer key sent as `oauth_consumer_key`.
	#[serde(default)]
	pub consumer_key: String,
	/// OAuth consumer secret; feeds the signing key, never the wire.
	#[serde(default)]
	pub consumer_secret: String,
	/// Endpoint path overrides.
	#[serde(default)]
	pub endpoints: EndpointPaths,
}
impl ConsumerConfig {
	/// Creates a config for the given credential pair.
	pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			..Default::default()
		}
	}

	/// Sets the provider-assigned application identifier.
	pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
		self.consumer_app_id = app_id.into();

		self
	}

	/// Replaces the endpoint path set.
	pub fn with_endpoints(mut self, endpoints: EndpointPaths) -> Self {
		self.endpoints = endpoints;

		self
	}
}
impl Debug for ConsumerConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConsumerConfig")
			.field("consumer_app_id", &self.consumer_app_id)
			.field("consumer_key", &self.consumer_key)
			.field("consumer_secret_set", &!self.consumer_secret.is_empty())
			.field("endpoints", &self.endpoints)
			.finish()
	}
}

/// Provider endpoint paths, resolved against a base URL by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPaths {
	/// Request-token endpoint path.
	#[serde(default = "default_request_token")]
	pub request_token: String,
	/// Access-token endpoint path (serves both the verifier exchange and refresh).
	#[serde(default = "default_access_token")]
	pub access_token: String,
	/// Interactive authorization endpoint path.
	#[serde(default = "default_authorize")]
	pub authorize: String,
}
impl EndpointPaths {
	/// Returns the configured path for an endpoint.
	pub fn path(&self, endpoint: Endpoint) -> &str {
		match endpoint {
			Endpoint::RequestToken => &self.request_token,
			Endpoint::AccessToken => &self.access_token,
			Endpoint::Authorize => &self.authorize,
		}
	}

	/// Overrides the request-token path.
	pub fn with_request_token(mut self, path: impl Into<String>) -> Self {
		self.request_token = path.into();

		self
	}

	/// Overrides the access-token path.
	pub fn with_access_token(mut self, path: impl Into<String>) -> Self {
		self.access_token = path.into();

		self
	}

	/// Overrides the authorize path.
	pub fn with_authorize(mut self, path: impl Into<String>) -> Self {
		self.authorize = path.into();

		self
	}
}
impl Default for EndpointPaths {
	fn default() -> Self {
		Self {
			request_token: default_request_token(),
			access_token: default_access_token(),
			authorize: default_authorize(),
		}
	}
}

fn default_request_token() -> String {
	"oauth/request_token".to_owned()
}

fn default_access_token() -> String {
	"oauth/access_token".to_owned()
}

fn default_authorize() -> String {
	"oauth/authorize".to_owned()
}
