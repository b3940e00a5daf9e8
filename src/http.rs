//! Transport boundary for signed OAuth 1.0a exchanges.
//!
//! [`SigningTransport`] is the engine's only dependency on an HTTP stack. The lifecycle
//! core hands a transport the assembled `oauth_*` parameter set and the composed signing
//! key; the transport signs, dispatches, and reports back through two shapes:
//! [`ExchangeReply`] for token exchanges (the body parsed into a key/value mapping) and
//! [`ResourceReply`] for generic resource calls (the raw response surface). A
//! reqwest-backed implementation ships behind the default `reqwest` feature; custom
//! transports reuse the [`sign`] helpers so signature construction stays in one place.

pub mod sign;

// crates.io
use http::Method;
#[cfg(feature = "reqwest")] use reqwest::header::AUTHORIZATION;
// self
use crate::{_prelude::*, error::TransportError, params::ParameterSet, signing::SigningKey};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, provider::EndpointPaths};

/// Provider endpoints addressed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	/// Endpoint issuing short-lived request tokens.
	RequestToken,
	/// Endpoint serving both the verifier exchange and session refresh.
	AccessToken,
	/// Interactive endpoint the end user is redirected to.
	Authorize,
}

/// Parsed result of a token exchange: status code plus the form-decoded body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangeReply {
	/// HTTP status code returned by the token endpoint.
	pub status: u16,
	/// Key/value fields decoded from the response body.
	pub fields: BTreeMap<String, String>,
}
impl ExchangeReply {
	/// Creates an empty reply with the given status.
	pub fn new(status: u16) -> Self {
		Self { status, fields: BTreeMap::new() }
	}

	/// Adds a body field; builder-style, mainly for tests and scripted transports.
	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.fields.insert(key.into(), value.into());

		self
	}

	/// Decodes an `application/x-www-form-urlencoded` body into a reply.
	pub fn from_form_body(status: u16, body: &str) -> Result<Self> {
		let fields = serde_urlencoded::from_str(body)
			.map_err(|source| TransportError::BodyDecode { source })?;

		Ok(Self { status, fields })
	}
}

/// Raw result of a signed resource call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceReply {
	/// HTTP status code returned by the resource server.
	pub status: u16,
	/// Response headers with lower-cased names.
	pub headers: BTreeMap<String, String>,
	/// Raw response body, surfaced regardless of status.
	pub body: String,
}
impl ResourceReply {
	/// Creates a reply with the given status and body.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Adds a header; builder-style, mainly for tests and scripted transports.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into().to_ascii_lowercase(), value.into());

		self
	}

	/// `WWW-Authenticate` challenge, when the response carried one.
	pub fn www_authenticate(&self) -> Option<&str> {
		self.headers.get("www-authenticate").map(String::as_str)
	}

	/// Returns `true` for the one status the protocol treats as authenticated success.
	pub fn is_success(&self) -> bool {
		self.status == 200
	}
}

/// Boxed `Send` future returned by transport calls.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing signed OAuth 1.0a calls.
///
/// Implementations must be `Send + Sync + 'static` so a [`Consumer`](crate::flows::Consumer)
/// can share them behind `Arc` without extra wrappers, and the futures they return must
/// be `Send` for the lifetime of the in-flight operation. Each call is a single
/// request/response exchange; the engine never streams, retries, or cancels, and timeout
/// policy belongs to the transport.
pub trait SigningTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a token exchange: POSTs the signed `oauth_*` parameters to the given
	/// endpoint and parses the form-encoded body into [`ExchangeReply::fields`].
	fn post<'a>(
		&'a self,
		endpoint: Endpoint,
		oauth: &'a ParameterSet,
		signing_key: &'a SigningKey,
	) -> TransportFuture<'a, ExchangeReply>;

	/// Executes a generic signed resource call and returns the raw response surface.
	///
	/// `body` is sent form-encoded and participates in the signature.
	fn send<'a>(
		&'a self,
		method: Method,
		path: &'a str,
		body: &'a [(String, String)],
		oauth: &'a ParameterSet,
		signing_key: &'a SigningKey,
	) -> TransportFuture<'a, ResourceReply>;

	/// Materializes a provider URL, notably the authorize redirect for end users.
	fn url(&self, endpoint: Endpoint, query: &[(String, String)]) -> Result<Url>;
}

/// Reqwest-backed [`SigningTransport`] with eagerly validated endpoint URLs.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestSigningTransport {
	client: ReqwestClient,
	base: Url,
	request_token: Url,
	access_token: Url,
	authorize: Url,
}
#[cfg(feature = "reqwest")]
impl ReqwestSigningTransport {
	/// Creates a transport rooted at the provider base URL.
	pub fn new(base: Url, paths: &EndpointPaths) -> Result<Self> {
		Self::with_client(ReqwestClient::default(), base, paths)
	}

	/// Wraps an existing [`ReqwestClient`], resolving every endpoint path up front so
	/// misconfiguration surfaces at construction instead of mid-flow.
	pub fn with_client(client: ReqwestClient, base: Url, paths: &EndpointPaths) -> Result<Self> {
		let request_token = resolve(&base, &paths.request_token)?;
		let access_token = resolve(&base, &paths.access_token)?;
		let authorize = resolve(&base, &paths.authorize)?;

		Ok(Self { client, base, request_token, access_token, authorize })
	}

	fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
		match endpoint {
			Endpoint::RequestToken => &self.request_token,
			Endpoint::AccessToken => &self.access_token,
			Endpoint::Authorize => &self.authorize,
		}
	}
}
#[cfg(feature = "reqwest")]
impl SigningTransport for ReqwestSigningTransport {
	fn post<'a>(
		&'a self,
		endpoint: Endpoint,
		oauth: &'a ParameterSet,
		signing_key: &'a SigningKey,
	) -> TransportFuture<'a, ExchangeReply> {
		Box::pin(async move {
			let url = self.endpoint_url(endpoint).clone();
			let authorization =
				sign::authorization_header(&Method::POST, &url, oauth, &[], signing_key)?;
			let response = self
				.client
				.post(url)
				.header(AUTHORIZATION, authorization)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			ExchangeReply::from_form_body(status, &body)
		})
	}

	fn send<'a>(
		&'a self,
		method: Method,
		path: &'a str,
		body: &'a [(String, String)],
		oauth: &'a ParameterSet,
		signing_key: &'a SigningKey,
	) -> TransportFuture<'a, ResourceReply> {
		Box::pin(async move {
			let url = self.base.join(path).map_err(|source| ConfigError::InvalidEndpoint {
				path: path.to_owned(),
				source,
			})?;
			let authorization = sign::authorization_header(&method, &url, oauth, body, signing_key)?;
			let mut request = self.client.request(method, url).header(AUTHORIZATION, authorization);

			if !body.is_empty() {
				request = request.form(body);
			}

			let response = request.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let mut headers = BTreeMap::new();

			for (name, value) in response.headers() {
				if let Ok(value) = value.to_str() {
					headers.insert(name.as_str().to_owned(), value.to_owned());
				}
			}

			let body = response.text().await.map_err(TransportError::from)?;

			Ok(ResourceReply { status, headers, body })
		})
	}

	fn url(&self, endpoint: Endpoint, query: &[(String, String)]) -> Result<Url> {
		let mut url = self.endpoint_url(endpoint).clone();

		if !query.is_empty() {
			url.query_pairs_mut()
				.extend_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())));
		}

		Ok(url)
	}
}

#[cfg(feature = "reqwest")]
fn resolve(base: &Url, path: &str) -> Result<Url> {
	base.join(path)
		.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source }.into())
}
