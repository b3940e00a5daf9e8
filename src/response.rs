//! Provider response interpretation shared by every token exchange.
//!
//! The same routine serves `request`, `verify`, and `refresh`; the invoking operation
//! is carried along for caller context only and never changes the interpretation.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	http::ExchangeReply,
	params::Operation,
};

/// Interprets a token-exchange reply.
///
/// Success means the body carries a non-empty `oauth_token`; the full body becomes the
/// replacement token, with `expires` / `auth_expires` derived from the provider's
/// relative lifetimes when those parse as integers. Anything else is a
/// [`Error::Provider`] rejection following the message rules documented on
/// [`rejection`].
pub fn interpret_exchange(
	operation: Operation,
	reply: &ExchangeReply,
	now: OffsetDateTime,
) -> Result<Token> {
	let usable = reply.fields.get("oauth_token").is_some_and(|value| !value.is_empty());

	if !usable {
		return Err(rejection(operation, reply));
	}

	let mut token = Token::default();

	for (key, value) in &reply.fields {
		match key.as_str() {
			"oauth_token" => token.oauth_token = Some(value.clone()),
			"oauth_token_secret" => token.oauth_token_secret = Some(TokenSecret::new(value.clone())),
			"oauth_verifier" => token.oauth_verifier = Some(value.clone()),
			"oauth_session_handle" => token.oauth_session_handle = Some(value.clone()),
			_ => {
				token.extra.insert(key.clone(), value.clone());
			},
		}
	}

	token.expires = lifetime(reply, "oauth_expires_in").map(|secs| now + Duration::seconds(secs));
	token.auth_expires = lifetime(reply, "oauth_authorization_expires_in")
		.map(|secs| now + Duration::seconds(secs));

	Ok(token)
}

/// Builds the rejection for a reply with no usable token.
///
/// The message starts as `Unknown Error`, becomes `Error {status}` for non-200
/// statuses, and gains `: {humanized problem}` when the body carries an
/// `oauth_problem` code.
fn rejection(operation: Operation, reply: &ExchangeReply) -> Error {
	let mut message = if reply.status == 200 {
		"Unknown Error".to_owned()
	} else {
		format!("Error {}", reply.status)
	};
	let problem = reply.fields.get("oauth_problem").cloned();

	if let Some(problem) = &problem {
		message = format!("{message}: {}", humanize_problem(problem));
	}

	Error::Provider { operation, message, status: reply.status, problem }
}

/// Renders a snake-case provider problem code as a display phrase, e.g.
/// `token_expired` becomes `Token Expired`. Display only; never branch on the output.
pub fn humanize_problem(code: &str) -> String {
	code.split('_')
		.filter(|word| !word.is_empty())
		.map(capitalize)
		.collect::<Vec<_>>()
		.join(" ")
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn lifetime(reply: &ExchangeReply, key: &str) -> Option<i64> {
	reply.fields.get(key)?.parse().ok()
}
