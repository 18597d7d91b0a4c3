// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for executor activity.
#[derive(Debug, Default)]
pub struct ExecutorMetrics {
	dispatches: AtomicU64,
	auth_retries: AtomicU64,
	throttled: AtomicU64,
	throttle_reports: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl ExecutorMetrics {
	/// Returns the total number of network attempts.
	pub fn dispatches(&self) -> u64 {
		self.dispatches.load(Ordering::Relaxed)
	}

	/// Returns the number of token-refresh retries triggered by HTTP 401.
	pub fn auth_retries(&self) -> u64 {
		self.auth_retries.load(Ordering::Relaxed)
	}

	/// Returns the number of HTTP 429 responses observed.
	pub fn throttled(&self) -> u64 {
		self.throttled.load(Ordering::Relaxed)
	}

	/// Returns the number of HTTP 429 responses reported as development-sandbox diagnostics.
	pub fn throttle_reports(&self) -> u64 {
		self.throttle_reports.load(Ordering::Relaxed)
	}

	/// Returns the number of call chains that completed without an error.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of call chains that completed with an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_auth_retry(&self) {
		self.auth_retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_throttled(&self) {
		self.throttled.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_throttle_report(&self) {
		self.throttle_reports.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_completion(&self, success: bool) {
		if success {
			self.success.fetch_add(1, Ordering::Relaxed);
		} else {
			self.failure.fetch_add(1, Ordering::Relaxed);
		}
	}
}
