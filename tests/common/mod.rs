//! Fakes shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
// self
use xbl_http_pipeline::{
	auth::{AuthFuture, AuthProvider, AuthRequest, AuthToken},
	call::{CallDescriptor, XboxLiveApi},
	config::{CallSettings, ThrottleDiagnostics},
	diagnostics::{CallRecord, DiagnosticsSink},
	error::{AuthError, TransportError},
	executor::CallExecutor,
	throttle::ThrottleRegistry,
	transport::{RawResponse, Transport, TransportFuture, TransportRequest},
};

pub const QUOTA_URL: &str = "https://titlestorage.xboxlive.com/global/scids/0001/data/quota";

pub enum Step {
	Respond(RawResponse),
	Fail(TransportError),
	Hang,
}

/// Transport replaying queued steps; `Hang` never resolves.
#[derive(Clone, Default)]
pub struct QueueTransport {
	steps: Arc<Mutex<VecDeque<Step>>>,
	seen: Arc<Mutex<Vec<TransportRequest>>>,
}
impl QueueTransport {
	pub fn then(self, step: Step) -> Self {
		self.steps.lock().push_back(step);

		self
	}

	pub fn then_status(self, status: u16) -> Self {
		self.then(Step::Respond(RawResponse::new(status)))
	}

	pub fn seen(&self) -> Vec<TransportRequest> {
		self.seen.lock().clone()
	}

	pub fn calls(&self) -> usize {
		self.seen.lock().len()
	}
}
impl Transport for QueueTransport {
	fn perform(&self, request: TransportRequest) -> TransportFuture<'_> {
		self.seen.lock().push(request);

		let step = self.steps.lock().pop_front();

		Box::pin(async move {
			match step {
				Some(Step::Respond(response)) => Ok(response),
				Some(Step::Fail(err)) => Err(err),
				Some(Step::Hang) => std::future::pending().await,
				None => panic!("Transport was called more often than scripted."),
			}
		})
	}
}

/// Provider with a fixed token and a queue of refresh outcomes.
#[derive(Default)]
pub struct RefreshingProvider {
	token: Mutex<Option<Result<AuthToken, AuthError>>>,
	refreshes: Mutex<VecDeque<Result<AuthToken, AuthError>>>,
	token_calls: AtomicUsize,
	refresh_calls: AtomicUsize,
}
impl RefreshingProvider {
	pub fn issuing(token: &str) -> Self {
		let provider = Self::default();

		*provider.token.lock() = Some(Ok(AuthToken::new(token, "")));

		provider
	}

	pub fn failing(err: AuthError) -> Self {
		let provider = Self::default();

		*provider.token.lock() = Some(Err(err));

		provider
	}

	pub fn on_refresh(self, outcome: Result<AuthToken, AuthError>) -> Self {
		self.refreshes.lock().push_back(outcome);

		self
	}

	pub fn token_calls(&self) -> usize {
		self.token_calls.load(Ordering::SeqCst)
	}

	pub fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}
}
impl AuthProvider for RefreshingProvider {
	fn get_auth_result<'a>(&'a self, _request: AuthRequest<'a>) -> AuthFuture<'a> {
		self.token_calls.fetch_add(1, Ordering::SeqCst);

		let outcome = match &*self.token.lock() {
			Some(Ok(token)) => Ok(token.clone()),
			Some(Err(AuthError::UserNotSignedIn)) | None => Err(AuthError::UserNotSignedIn),
			Some(Err(err)) => Err(AuthError::token_fetch(err.to_string())),
		};

		Box::pin(async move { outcome })
	}

	fn refresh_token(&self) -> AuthFuture<'_> {
		self.refresh_calls.fetch_add(1, Ordering::SeqCst);

		let outcome = self
			.refreshes
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(AuthError::token_fetch("no refresh scripted")));

		Box::pin(async move { outcome })
	}
}

/// Sink collecting every record.
#[derive(Default)]
pub struct CollectingSink(pub Mutex<Vec<CallRecord>>);
impl DiagnosticsSink for CollectingSink {
	fn record(&self, record: &CallRecord) {
		self.0.lock().push(record.clone());
	}
}

pub fn settings() -> CallSettings {
	CallSettings::builder()
		.throttle_diagnostics(ThrottleDiagnostics::Disabled)
		.build()
		.expect("Test settings should validate.")
}

pub fn executor(
	transport: &QueueTransport,
	provider: Option<Arc<dyn AuthProvider>>,
) -> (CallExecutor<QueueTransport>, Arc<ThrottleRegistry>) {
	executor_with(settings(), transport, provider)
}

pub fn executor_with(
	settings: CallSettings,
	transport: &QueueTransport,
	provider: Option<Arc<dyn AuthProvider>>,
) -> (CallExecutor<QueueTransport>, Arc<ThrottleRegistry>) {
	let registry = Arc::new(ThrottleRegistry::default());
	let mut executor = CallExecutor::new(settings, Arc::new(transport.clone()))
		.expect("Executor should build.")
		.with_throttle_registry(registry.clone());

	if let Some(provider) = provider {
		executor = executor.with_auth_provider(provider);
	}

	(executor, registry)
}

pub fn quota_call(executor: &CallExecutor<QueueTransport>) -> CallDescriptor {
	executor
		.descriptor("GET", QUOTA_URL, XboxLiveApi::GetQuota)
		.expect("Quota descriptor should build.")
}
