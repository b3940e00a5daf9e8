//! OAuth 1.0a consumer engine—drive three-legged token exchanges, session refresh, and signed
//! resource access against any provider.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod params;
pub mod provider;
pub mod response;
pub mod signing;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for lifecycle tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::{
			Mutex,
			atomic::{AtomicUsize, Ordering},
		},
	};
	// crates.io
	use http::Method;
	// self
	use crate::{
		error::TransportError,
		flows::Consumer,
		http::{Endpoint, ExchangeReply, ResourceReply, SigningTransport, TransportFuture},
		params::{EntropySource, ParameterSet},
		provider::{ConsumerConfig, EndpointPaths},
		signing::SigningKey,
	};

	/// Consumer type alias used by scripted lifecycle tests.
	pub type StaticConsumer = Consumer<StaticTransport, FixedEntropy>;

	/// Deterministic clock + randomness source so tests can assert exact parameter sets.
	#[derive(Clone, Copy, Debug)]
	pub struct FixedEntropy {
		/// Instant returned by every `now` call.
		pub at: OffsetDateTime,
		/// Value returned by every `random` call.
		pub value: u64,
	}
	impl Default for FixedEntropy {
		fn default() -> Self {
			Self { at: time::macros::datetime!(2025-06-01 12:00 UTC), value: 7 }
		}
	}
	impl EntropySource for FixedEntropy {
		fn now(&self) -> OffsetDateTime {
			self.at
		}

		fn random(&self) -> u64 {
			self.value
		}
	}

	/// Call arguments captured by [`StaticTransport`] for post-hoc assertions.
	#[derive(Clone, Debug)]
	pub struct CapturedCall {
		/// OAuth parameter set the engine handed to the transport.
		pub oauth: ParameterSet,
		/// Raw signing-key string the engine handed to the transport.
		pub signing_key: String,
	}

	/// Scripted transport that returns canned replies and counts every signed invocation.
	#[derive(Debug)]
	pub struct StaticTransport {
		base: Url,
		paths: EndpointPaths,
		exchanges: Mutex<VecDeque<ExchangeReply>>,
		resources: Mutex<VecDeque<ResourceReply>>,
		calls: AtomicUsize,
		captured: Mutex<Vec<CapturedCall>>,
	}
	impl StaticTransport {
		/// Creates a transport rooted at a fixed dummy provider origin.
		pub fn new() -> Self {
			Self {
				base: Url::parse("https://provider.test/")
					.expect("Static provider origin should parse."),
				paths: EndpointPaths::default(),
				exchanges: Mutex::default(),
				resources: Mutex::default(),
				calls: AtomicUsize::default(),
				captured: Mutex::default(),
			}
		}

		/// Queues a reply for the next token-exchange call.
		pub fn push_exchange(&self, reply: ExchangeReply) {
			self.exchanges
				.lock()
				.expect("Exchange queue lock should not be poisoned.")
				.push_back(reply);
		}

		/// Queues a reply for the next resource call.
		pub fn push_resource(&self, reply: ResourceReply) {
			self.resources
				.lock()
				.expect("Resource queue lock should not be poisoned.")
				.push_back(reply);
		}

		/// Number of signed transport invocations observed so far.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		/// Snapshot of every captured call, oldest first.
		pub fn captured(&self) -> Vec<CapturedCall> {
			self.captured.lock().expect("Capture lock should not be poisoned.").clone()
		}

		fn record(&self, oauth: &ParameterSet, signing_key: &SigningKey) {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.captured.lock().expect("Capture lock should not be poisoned.").push(
				CapturedCall {
					oauth: oauth.clone(),
					signing_key: signing_key.expose().to_owned(),
				},
			);
		}
	}
	impl Default for StaticTransport {
		fn default() -> Self {
			Self::new()
		}
	}
	impl SigningTransport for StaticTransport {
		fn post<'a>(
			&'a self,
			_endpoint: Endpoint,
			oauth: &'a ParameterSet,
			signing_key: &'a SigningKey,
		) -> TransportFuture<'a, ExchangeReply> {
			self.record(oauth, signing_key);

			let reply = self
				.exchanges
				.lock()
				.expect("Exchange queue lock should not be poisoned.")
				.pop_front();

			Box::pin(async move {
				reply.ok_or_else(|| {
					TransportError::network_message(
						"Static transport ran out of scripted exchange replies.",
					)
					.into()
				})
			})
		}

		fn send<'a>(
			&'a self,
			_method: Method,
			_path: &'a str,
			_body: &'a [(String, String)],
			oauth: &'a ParameterSet,
			signing_key: &'a SigningKey,
		) -> TransportFuture<'a, ResourceReply> {
			self.record(oauth, signing_key);

			let reply = self
				.resources
				.lock()
				.expect("Resource queue lock should not be poisoned.")
				.pop_front();

			Box::pin(async move {
				reply.ok_or_else(|| {
					TransportError::network_message(
						"Static transport ran out of scripted resource replies.",
					)
					.into()
				})
			})
		}

		fn url(&self, endpoint: Endpoint, query: &[(String, String)]) -> Result<Url> {
			let mut url = self
				.base
				.join(self.paths.path(endpoint))
				.expect("Static provider origin should absorb the default endpoint paths.");

			if !query.is_empty() {
				url.query_pairs_mut()
					.extend_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())));
			}

			Ok(url)
		}
	}

	/// Builds a consumer wired to a scripted transport and deterministic entropy.
	pub fn scripted_consumer(config: ConsumerConfig) -> (StaticConsumer, Arc<StaticTransport>) {
		let transport = Arc::new(StaticTransport::new());
		let consumer = Consumer::with_entropy(config, transport.clone(), FixedEntropy::default());

		(consumer, transport)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use time;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
