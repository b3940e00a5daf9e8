//! OAuth 1.0a signature assembly shared by HTTP transports.
//!
//! The lifecycle core never calls into this module; it exists so the bundled reqwest
//! transport and any custom [`SigningTransport`](crate::http::SigningTransport)
//! implementation agree on base-string and `Authorization` header construction.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use http::Method;
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	params::ParameterSet,
	signing::{SigningKey, percent_encode},
};

type HmacSha1 = Hmac<Sha1>;

/// Renders the `Authorization: OAuth …` header value for a signed request.
pub fn authorization_header(
	method: &Method,
	url: &Url,
	oauth: &ParameterSet,
	extra: &[(String, String)],
	signing_key: &SigningKey,
) -> Result<String> {
	let signature = compute_signature(method, url, oauth, extra, signing_key)?;
	let mut rendered: Vec<String> = oauth
		.iter()
		.map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
		.collect();

	rendered.push(format!("oauth_signature=\"{}\"", percent_encode(&signature)));

	Ok(format!("OAuth {}", rendered.join(", ")))
}

/// Computes the base64 HMAC-SHA1 digest over the request's signature base string.
pub fn compute_signature(
	method: &Method,
	url: &Url,
	oauth: &ParameterSet,
	extra: &[(String, String)],
	signing_key: &SigningKey,
) -> Result<String> {
	let base = signature_base_string(method, url, oauth, extra);
	let mut mac = HmacSha1::new_from_slice(signing_key.expose().as_bytes())
		.map_err(|source| ConfigError::SigningKey { source })?;

	mac.update(base.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the signature base string: uppercase method, the encoded base URL (query and
/// fragment stripped), and the encoded normalized parameter string: URL query, body,
/// and `oauth_*` parameters encoded first, then sorted.
pub fn signature_base_string(
	method: &Method,
	url: &Url,
	oauth: &ParameterSet,
	extra: &[(String, String)],
) -> String {
	let mut pairs: Vec<(String, String)> = url
		.query_pairs()
		.map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
		.collect();

	pairs.extend(extra.iter().map(|(key, value)| (percent_encode(key), percent_encode(value))));
	pairs.extend(oauth.iter().map(|(key, value)| (percent_encode(key), percent_encode(value))));
	pairs.sort();

	let normalized =
		pairs.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");
	let mut base_url = url.clone();

	base_url.set_query(None);
	base_url.set_fragment(None);

	format!(
		"{}&{}&{}",
		method.as_str().to_uppercase(),
		percent_encode(base_url.as_str()),
		percent_encode(&normalized)
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn one_param_set() -> ParameterSet {
		let mut set = ParameterSet::new();

		set.set("oauth_nonce", "abc");

		set
	}

	#[test]
	fn base_string_joins_method_url_and_normalized_params() {
		let url = Url::parse("https://api.example.com/r").expect("Fixture URL should parse.");
		let base = signature_base_string(&Method::GET, &url, &one_param_set(), &[]);

		assert_eq!(base, "GET&https%3A%2F%2Fapi.example.com%2Fr&oauth_nonce%3Dabc");
	}

	#[test]
	fn query_and_body_parameters_join_the_sorted_normalization() {
		let url =
			Url::parse("https://api.example.com/r?z=1").expect("Fixture URL should parse.");
		let body = [("a".to_owned(), "2".to_owned())];
		let base = signature_base_string(&Method::POST, &url, &one_param_set(), &body);

		assert_eq!(base, "POST&https%3A%2F%2Fapi.example.com%2Fr&a%3D2%26oauth_nonce%3Dabc%26z%3D1");
	}

	#[test]
	fn header_carries_every_parameter_plus_the_signature() {
		let url = Url::parse("https://api.example.com/r").expect("Fixture URL should parse.");
		let key = SigningKey::assemble("consumer-secret", Some("token-secret"));
		let header = authorization_header(&Method::GET, &url, &one_param_set(), &[], &key)
			.expect("Header assembly should succeed.");

		assert!(header.starts_with("OAuth "));
		assert!(header.contains("oauth_nonce=\"abc\""));
		assert!(header.contains("oauth_signature=\""));
	}

	#[test]
	fn signature_is_a_base64_hmac_sha1_digest() {
		let url = Url::parse("https://api.example.com/r").expect("Fixture URL should parse.");
		let key = SigningKey::assemble("consumer-secret", None);
		let signature = compute_signature(&Method::GET, &url, &one_param_set(), &[], &key)
			.expect("Signature computation should succeed.");

		// 20 HMAC-SHA1 bytes render as 28 base64 characters.
		assert_eq!(signature.len(), 28);
	}
}
