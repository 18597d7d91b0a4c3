//! Authenticated HTTP call pipeline for Xbox Live service clients.
//!
//! Every service call is described by a [`call::CallDescriptor`] and driven to completion by a
//! [`executor::CallExecutor`]. The executor attaches a token from an [`auth::AuthProvider`],
//! budgets each attempt against a rolling timeout window, retries once after an HTTP 401 with a
//! refreshed token, and records HTTP 429 responses in the shared [`throttle::ThrottleRegistry`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod call;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod obs;
pub mod throttle;
pub mod timeout;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and scripted collaborators for tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		auth::{AuthFuture, AuthProvider, AuthRequest, AuthToken},
		call::HeaderSet,
		config::CallSettings,
		error::{AuthError, TransportError},
		executor::CallExecutor,
		throttle::ThrottleRegistry,
		transport::{RawResponse, Transport, TransportFuture, TransportRequest},
	};

	/// Transport that replays a queue of canned outcomes and records every request it sees.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport {
		outcomes: Arc<Mutex<VecDeque<Result<RawResponse, TransportError>>>>,
		requests: Arc<Mutex<Vec<TransportRequest>>>,
	}
	impl ScriptedTransport {
		/// Queues a response with the provided status and no body.
		pub fn respond(self, status: u16) -> Self {
			self.respond_with(RawResponse::new(status))
		}

		/// Queues a fully specified response.
		pub fn respond_with(self, response: RawResponse) -> Self {
			self.outcomes.lock().push_back(Ok(response));

			self
		}

		/// Queues a transport failure.
		pub fn fail_with(self, error: TransportError) -> Self {
			self.outcomes.lock().push_back(Err(error));

			self
		}

		/// Returns every request dispatched so far.
		pub fn requests(&self) -> Vec<TransportRequest> {
			self.requests.lock().clone()
		}

		/// Returns how many network attempts were dispatched.
		pub fn dispatch_count(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl Transport for ScriptedTransport {
		fn perform(&self, request: TransportRequest) -> TransportFuture<'_> {
			self.requests.lock().push(request);

			let outcome = self.outcomes.lock().pop_front();

			Box::pin(async move {
				outcome.unwrap_or_else(|| {
					Err(TransportError::InvalidRequest {
						reason: "no scripted outcome left".into(),
					})
				})
			})
		}
	}

	/// Auth provider with scripted token and refresh outcomes plus call counters.
	#[derive(Debug, Default)]
	pub struct ScriptedAuthProvider {
		tokens: Mutex<VecDeque<Result<AuthToken, AuthError>>>,
		refreshes: Mutex<VecDeque<Result<AuthToken, AuthError>>>,
		token_calls: Mutex<usize>,
		refresh_calls: Mutex<usize>,
	}
	impl ScriptedAuthProvider {
		/// Queues an outcome for the next `get_auth_result` call.
		pub fn token(self, outcome: Result<AuthToken, AuthError>) -> Self {
			self.tokens.lock().push_back(outcome);

			self
		}

		/// Queues an outcome for the next `refresh_token` call.
		pub fn refresh(self, outcome: Result<AuthToken, AuthError>) -> Self {
			self.refreshes.lock().push_back(outcome);

			self
		}

		/// Returns how many times a token was requested.
		pub fn token_calls(&self) -> usize {
			*self.token_calls.lock()
		}

		/// Returns how many times a refresh was requested.
		pub fn refresh_calls(&self) -> usize {
			*self.refresh_calls.lock()
		}
	}
	impl AuthProvider for ScriptedAuthProvider {
		fn get_auth_result<'a>(&'a self, _request: AuthRequest<'a>) -> AuthFuture<'a> {
			*self.token_calls.lock() += 1;

			let outcome = self.tokens.lock().pop_front();

			Box::pin(async move {
				outcome.unwrap_or_else(|| Ok(AuthToken::new("XBL3.0 x=scripted;token", "")))
			})
		}

		fn refresh_token(&self) -> AuthFuture<'_> {
			*self.refresh_calls.lock() += 1;

			let outcome = self.refreshes.lock().pop_front();

			Box::pin(async move {
				outcome.unwrap_or_else(|| Err(AuthError::token_fetch("no scripted refresh left")))
			})
		}
	}

	/// Settings used across tests: defaults with throttle diagnostics silenced.
	pub fn test_settings() -> CallSettings {
		CallSettings::builder()
			.throttle_diagnostics(crate::config::ThrottleDiagnostics::Disabled)
			.build()
			.expect("Default test settings should validate.")
	}

	/// Builds an executor over `transport` with its own throttle registry.
	pub fn build_test_executor<T>(
		transport: Arc<T>,
		auth: Option<Arc<dyn AuthProvider>>,
	) -> (CallExecutor<T>, Arc<ThrottleRegistry>)
	where
		T: Transport,
	{
		let registry = Arc::new(ThrottleRegistry::default());
		let mut executor = CallExecutor::new(test_settings(), transport)
			.expect("Test settings should produce an executor.")
			.with_throttle_registry(registry.clone());

		if let Some(provider) = auth {
			executor = executor.with_auth_provider(provider);
		}

		(executor, registry)
	}

	/// Returns a header set holding a single header, for building raw responses.
	pub fn single_header(name: &str, value: &str) -> HeaderSet {
		let mut headers = HeaderSet::new();

		headers.insert(name, value);

		headers
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
