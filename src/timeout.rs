//! Per-attempt timeout budgeting.
//!
//! A call chain gets one rolling window (default 20 seconds) that covers its first attempt and
//! its single auth retry. Each attempt receives whatever is left of the window, capped by the
//! default timeout and floored by the minimum timeout, so a retry never receives a zero or
//! negative budget. Long calls opt out of the window entirely.

// self
use crate::{_prelude::*, config::CallSettings};

/// Computes the timeout for the next attempt.
///
/// - `is_long_call` returns `long` unconditionally.
/// - Otherwise returns `max(min, min(default, window_total - elapsed))`.
///
/// Negative `elapsed` values are treated as zero.
pub fn attempt_timeout(
	window_total: Duration,
	elapsed: Duration,
	default: Duration,
	min: Duration,
	long: Duration,
	is_long_call: bool,
) -> Duration {
	if is_long_call {
		return long;
	}

	let elapsed = elapsed.max(Duration::ZERO);
	let remaining = window_total.saturating_sub(elapsed);

	default.min(remaining).max(min)
}

/// Timeout values captured from [`CallSettings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutBudget {
	/// Rolling window shared by an attempt and its retry.
	pub window: Duration,
	/// Default per-attempt timeout.
	pub default: Duration,
	/// Floor for computed timeouts.
	pub min: Duration,
	/// Fixed timeout for long calls.
	pub long: Duration,
}
impl TimeoutBudget {
	/// Captures the timeout settings.
	pub fn from_settings(settings: &CallSettings) -> Self {
		Self {
			window: settings.http_timeout_window,
			default: settings.http_timeout,
			min: settings.min_http_timeout,
			long: settings.long_http_timeout,
		}
	}

	/// Computes the timeout for an attempt made `elapsed` after the chain's first attempt.
	pub fn attempt_timeout(&self, elapsed: Duration, is_long_call: bool) -> Duration {
		attempt_timeout(self.window, elapsed, self.default, self.min, self.long, is_long_call)
	}
}
impl Default for TimeoutBudget {
	fn default() -> Self {
		Self::from_settings(&CallSettings::default())
	}
}
