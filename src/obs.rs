//! Optional observability helpers for the call pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `xbl_http.call` with the `api` and `method` fields, plus
//!   events for auth retries and throttled responses.
//! - Enable `metrics` to increment the `xbl_http_call_total` counter for every call entry and
//!   completion, labeled by `api` + `outcome`, and `xbl_http_throttled_total` per `api` for
//!   throttled completions.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::{_prelude::*, call::CallResult, error::ErrorKind};

/// Outcome labels recorded for each call chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to the executor.
	Attempt,
	/// Completed without an error.
	Success,
	/// Completed with HTTP 429 or a fast-failed throttle.
	Throttled,
	/// Cancelled by the caller.
	Cancelled,
	/// Completed with any other error.
	Failure,
}
impl CallOutcome {
	/// Classifies a completed call.
	pub fn of(result: &CallResult) -> Self {
		match result.error_kind() {
			None => CallOutcome::Success,
			Some(ErrorKind::Throttled) => CallOutcome::Throttled,
			Some(ErrorKind::Cancelled) => CallOutcome::Cancelled,
			Some(_) => CallOutcome::Failure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Throttled => "throttled",
			CallOutcome::Cancelled => "cancelled",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
