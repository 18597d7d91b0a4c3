//! Call execution state machine.
//!
//! [`CallExecutor::execute`] drives one logical call chain through [`CallState`] until it
//! reaches `Completed`, then returns the [`CallResult`]; the returned future is the chain's single
//! completion. A chain makes at most two network attempts: the first, and one retry after a 401
//! once the auth provider has refreshed its token. Throttled responses are recorded in the
//! [`ThrottleRegistry`] and returned unchanged; the executor never retries them.

mod metrics;
mod state;

pub use metrics::ExecutorMetrics;
pub use state::*;

// std
use std::{pin::pin, time::Instant};
// crates.io
use futures::future::{self, Either};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{AuthAttacher, AuthProvider},
	call::{CallDescriptor, CallResult, XboxLiveApi},
	config::CallSettings,
	diagnostics::{self, CallRecord, DiagnosticsSink, TracingSink},
	error::{AuthError, ConfigError},
	obs::{self, CallSpan},
	throttle::{ThrottleRegistry, ThrottleState},
	timeout::TimeoutBudget,
	transport::{Transport, TransportRequest},
};

/// Executes call descriptors against a [`Transport`].
///
/// Cloning is cheap; clones share the transport, auth provider, throttle registry, diagnostics
/// sink, and metrics.
pub struct CallExecutor<T>
where
	T: Transport,
{
	settings: Arc<CallSettings>,
	budget: TimeoutBudget,
	transport: Arc<T>,
	auth: Option<Arc<dyn AuthProvider>>,
	registry: Arc<ThrottleRegistry>,
	diagnostics: Arc<dyn DiagnosticsSink>,
	metrics: Arc<ExecutorMetrics>,
}
impl<T> CallExecutor<T>
where
	T: Transport,
{
	/// Creates an executor using the process-wide throttle registry and the tracing sink.
	///
	/// The retry delay hint is raised to [`CallSettings::MIN_HTTP_RETRY_DELAY`] when lower.
	pub fn new(mut settings: CallSettings, transport: Arc<T>) -> Result<Self, ConfigError> {
		settings.validate()?;
		settings.set_http_retry_delay(settings.http_retry_delay);

		Ok(Self {
			budget: TimeoutBudget::from_settings(&settings),
			settings: Arc::new(settings),
			transport,
			auth: None,
			registry: ThrottleRegistry::global(),
			diagnostics: Arc::new(TracingSink),
			metrics: Default::default(),
		})
	}

	/// Sets the provider used for token attachment and the auth retry.
	pub fn with_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
		self.auth = Some(provider);

		self
	}

	/// Replaces the process-wide throttle registry with `registry`.
	pub fn with_throttle_registry(mut self, registry: Arc<ThrottleRegistry>) -> Self {
		self.registry = registry;

		self
	}

	/// Replaces the diagnostics sink.
	pub fn with_diagnostics_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
		self.diagnostics = sink;

		self
	}

	/// Settings shared by every chain this executor drives.
	pub fn settings(&self) -> &CallSettings {
		&self.settings
	}

	/// Throttle registry this executor records into.
	pub fn throttle_registry(&self) -> &Arc<ThrottleRegistry> {
		&self.registry
	}

	/// Activity counters.
	pub fn metrics(&self) -> &ExecutorMetrics {
		&self.metrics
	}

	/// Creates a descriptor with this executor's default headers.
	pub fn descriptor(&self, method: &str, url: &str, api: XboxLiveApi) -> Result<CallDescriptor> {
		CallDescriptor::new(&self.settings, method, url, api)
	}

	/// Runs `descriptor` to completion.
	pub async fn execute(&self, descriptor: CallDescriptor) -> CallResult {
		self.execute_with_cancellation(descriptor, &CancellationToken::new()).await
	}

	/// Runs `descriptor` to completion unless `cancel` fires first.
	///
	/// Cancellation is observed at every suspension point (token acquisition, token refresh,
	/// transport call); a cancelled chain completes with [`Error::Cancelled`] and makes no further
	/// network attempts.
	pub async fn execute_with_cancellation(
		&self,
		mut descriptor: CallDescriptor,
		cancel: &CancellationToken,
	) -> CallResult {
		let api = descriptor.api();
		let span = CallSpan::new(api, descriptor.method());

		obs::record_call_started(api);

		let started = Instant::now();
		let mut result = span.instrument(self.drive(&mut descriptor, cancel)).await;

		result.attempts = descriptor.attempts();
		result.elapsed = Duration::try_from(started.elapsed()).unwrap_or(Duration::MAX);

		self.metrics.record_completion(result.is_success());
		obs::record_call_finished(api, &result);

		result
	}

	async fn drive(
		&self,
		descriptor: &mut CallDescriptor,
		cancel: &CancellationToken,
	) -> CallResult {
		let mut state = CallState::Created;

		loop {
			state = match state {
				CallState::Completed(result) => return result,
				state => self.step(state, descriptor, cancel).await,
			};
		}
	}

	async fn step(
		&self,
		state: CallState,
		descriptor: &mut CallDescriptor,
		cancel: &CancellationToken,
	) -> CallState {
		match state {
			CallState::Created => {
				if self.settings.fast_fail_throttled {
					if let Some(result) = self.fast_fail(descriptor.api()) {
						return CallState::Completed(result);
					}
				}

				state::after_created(descriptor)
			},
			CallState::AttachingAuth => {
				let Some(provider) = self.auth.as_deref() else {
					return CallState::Completed(CallResult::failed(AuthError::token_fetch(
						"no auth provider is configured",
					)));
				};

				let attacher = AuthAttacher::new(provider);
				let attach = attacher.attach(descriptor);

				match cancellable(cancel, move || attach).await {
					Some(Ok(())) => CallState::Executing,
					Some(Err(e)) => CallState::Completed(CallResult::failed(e)),
					None => CallState::Completed(CallResult::failed(Error::Cancelled)),
				}
			},
			CallState::Executing => {
				if cancel.is_cancelled() {
					return CallState::Completed(CallResult::failed(Error::Cancelled));
				}

				let now = Instant::now();
				let elapsed = descriptor.elapsed_at(now);
				let timeout = self.budget.attempt_timeout(elapsed, descriptor.long_call());

				descriptor.begin_attempt(now);

				CallState::AwaitingResponse(TransportRequest::from_descriptor(
					descriptor,
					&self.settings,
					timeout,
				))
			},
			CallState::AwaitingResponse(request) => {
				if cancel.is_cancelled() {
					return CallState::Completed(CallResult::failed(Error::Cancelled));
				}

				let record =
					CallRecord::for_request(descriptor.api(), descriptor.attempts(), &request);

				self.metrics.record_dispatch();

				let dispatch = move || self.transport.perform(request);
				let result = match cancellable(cancel, dispatch).await {
					Some(Ok(response)) => CallResult::from_response(response),
					Some(Err(e)) => CallResult::failed(e),
					None => CallResult::failed(Error::Cancelled),
				};

				self.deliver(record.finish(&result));

				self.evaluate(descriptor, result)
			},
			CallState::RetryingAfterAuthFailure(unauthorized) => {
				let Some(provider) = self.auth.as_deref() else {
					return CallState::Completed(unauthorized);
				};

				let attacher = AuthAttacher::new(provider);
				let refresh = attacher.refresh(descriptor);

				match cancellable(cancel, move || refresh).await {
					Some(Ok(())) => {
						descriptor.mark_auth_retry();

						CallState::Executing
					},
					Some(Err(e)) => {
						obs::emit_auth_refresh_failed(descriptor.api(), &e);

						CallState::Completed(unauthorized)
					},
					None => CallState::Completed(CallResult::failed(Error::Cancelled)),
				}
			},
			CallState::Completed(result) => CallState::Completed(result),
		}
	}

	fn evaluate(&self, descriptor: &CallDescriptor, result: CallResult) -> CallState {
		let api = descriptor.api();

		match result.http_status {
			status if state::auth_retry_eligible(status, descriptor, self.auth.is_some()) => {
				obs::emit_auth_retry(api);
				self.metrics.record_auth_retry();

				CallState::RetryingAfterAuthFailure(result)
			},
			429 => {
				self.record_throttle(api, &result);

				CallState::Completed(result)
			},
			200..=299 => {
				self.registry.clear_state(api);

				CallState::Completed(result)
			},
			_ => CallState::Completed(result),
		}
	}

	fn record_throttle(&self, api: XboxLiveApi, result: &CallResult) {
		let message = match &result.error {
			Some(Error::Throttled { message, .. }) => Some(message.clone()),
			_ => None,
		};
		let state = ThrottleState::new(api, OffsetDateTime::now_utc())
			.with_retry_after(result.retry_after)
			.with_message(message.clone());

		self.registry.set_state(api, state);
		self.metrics.record_throttled();

		if let Some(level) = self.settings.throttle_report_level() {
			self.metrics.record_throttle_report();

			obs::emit_throttled(
				level,
				api,
				message.as_deref().unwrap_or("HTTP 429 Too Many Requests"),
			);
		}
	}

	/// Completes the chain without a network attempt while a recorded throttle outlasts the
	/// timeout window. Expired observations are cleared.
	fn fast_fail(&self, api: XboxLiveApi) -> Option<CallResult> {
		let state = self.registry.get_state(api)?;
		let deadline = state.retry_at()?;
		let now = OffsetDateTime::now_utc();

		if deadline <= now {
			self.registry.clear_state(api);

			return None;
		}
		if deadline <= now + self.settings.http_timeout_window {
			return None;
		}

		let retry_after = deadline - now;
		let message = state.message.unwrap_or_else(|| {
			format!("API is throttled; retry after {} seconds.", retry_after.whole_seconds())
		});

		Some(CallResult {
			error: Some(Error::Throttled { retry_after: Some(retry_after), message }),
			retry_after: Some(retry_after),
			..Default::default()
		})
	}

	fn deliver(&self, record: CallRecord) {
		if !diagnostics::deliver(self.diagnostics.as_ref(), &record) {
			obs::emit_sink_panicked(record.api);
		}
	}
}
impl<T> Clone for CallExecutor<T>
where
	T: Transport,
{
	fn clone(&self) -> Self {
		Self {
			settings: self.settings.clone(),
			budget: self.budget,
			transport: self.transport.clone(),
			auth: self.auth.clone(),
			registry: self.registry.clone(),
			diagnostics: self.diagnostics.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<T> Debug for CallExecutor<T>
where
	T: Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallExecutor")
			.field("settings", &self.settings)
			.field("has_auth_provider", &self.auth.is_some())
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}

/// Races the future built by `make` against `cancel`; `None` means the token fired first.
///
/// `make` only runs when the token has not fired yet.
async fn cancellable<M, F>(cancel: &CancellationToken, make: M) -> Option<F::Output>
where
	M: FnOnce() -> F,
	F: Future,
{
	if cancel.is_cancelled() {
		return None;
	}

	let cancelled = pin!(cancel.cancelled());
	let fut = pin!(make());

	match future::select(fut, cancelled).await {
		Either::Left((output, _)) => Some(output),
		Either::Right(_) => None,
	}
}
