//! Per-attempt diagnostics records and the sink contract that receives them.
//!
//! The executor emits one [`CallRecord`] per network attempt. Sinks are fire-and-forget: a sink
//! that panics is contained and never changes the call's result. Auth headers are redacted before
//! a record leaves the executor.

// std
use std::panic::{self, AssertUnwindSafe};
// self
use crate::{
	_prelude::*,
	call::{AUTHORIZATION_HEADER, CallResult, HeaderSet, SIGNATURE_HEADER, XboxLiveApi},
	error::ErrorKind,
	transport::TransportRequest,
};

const REDACTED: &str = "<redacted>";

/// Receives one record per network attempt.
pub trait DiagnosticsSink
where
	Self: Send + Sync,
{
	/// Consumes a record. Must not block.
	fn record(&self, record: &CallRecord);
}

/// Snapshot of one network attempt and its outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallRecord {
	/// Logical API id.
	pub api: XboxLiveApi,
	/// 1-based attempt number within the chain.
	pub attempt: u32,
	/// HTTP method.
	pub method: String,
	/// Request URL.
	pub url: String,
	/// Request headers with auth values redacted.
	pub request_headers: HeaderSet,
	/// Timeout the attempt ran with.
	pub timeout: Duration,
	/// When the attempt was dispatched.
	pub started_at: OffsetDateTime,
	/// Attempt duration.
	pub elapsed: Duration,
	/// Response status, or `0` when no response arrived.
	pub http_status: u16,
	/// Error classification, if the attempt failed.
	pub error: Option<ErrorKind>,
	/// Retry-After hint from the response.
	pub retry_after: Option<Duration>,
}
impl CallRecord {
	/// Starts a record for `request` before it is dispatched.
	pub fn for_request(api: XboxLiveApi, attempt: u32, request: &TransportRequest) -> Self {
		let mut request_headers = request.headers.clone();

		for name in [AUTHORIZATION_HEADER, SIGNATURE_HEADER] {
			if request_headers.contains(name) {
				request_headers.insert(name, REDACTED);
			}
		}

		Self {
			api,
			attempt,
			method: request.method.clone(),
			url: request.url.to_string(),
			request_headers,
			timeout: request.timeout,
			started_at: OffsetDateTime::now_utc(),
			elapsed: Duration::ZERO,
			http_status: 0,
			error: None,
			retry_after: None,
		}
	}

	/// Completes the record with the attempt's outcome.
	pub fn finish(mut self, result: &CallResult) -> Self {
		self.elapsed = OffsetDateTime::now_utc() - self.started_at;
		self.http_status = result.http_status;
		self.error = result.error_kind();
		self.retry_after = result.retry_after;

		self
	}
}

/// Sink that forwards records to `tracing` at debug level (no-op without the feature).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;
impl DiagnosticsSink for TracingSink {
	fn record(&self, record: &CallRecord) {
		#[cfg(feature = "tracing")]
		{
			tracing::debug!(
				api = record.api.as_str(),
				attempt = record.attempt,
				method = %record.method,
				url = %record.url,
				status = record.http_status,
				error = record.error.map(ErrorKind::as_str),
				timeout_ms = record.timeout.whole_milliseconds() as u64,
				elapsed_ms = record.elapsed.whole_milliseconds() as u64,
				"xbl_http.attempt"
			);
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = record;
		}
	}
}

/// Delivers `record` to `sink`, containing panics. Returns `false` when the sink panicked.
pub(crate) fn deliver(sink: &dyn DiagnosticsSink, record: &CallRecord) -> bool {
	panic::catch_unwind(AssertUnwindSafe(|| sink.record(record))).is_ok()
}
