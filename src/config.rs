//! Call settings shared by every descriptor and executor.
//!
//! [`CallSettings`] is the pipeline's only configuration surface: attempt timeouts, the rolling
//! timeout window that spans an attempt plus its one auth retry, default headers, and the
//! throttling diagnostics policy. Build values through [`CallSettings::builder`] so the
//! invariants the timeout budgeter relies on are validated once.

// self
use crate::{_prelude::*, error::ConfigError};

/// Sandbox name treated as production; throttling diagnostics stay quiet there.
pub const RETAIL_SANDBOX: &str = "RETAIL";

/// How loudly HTTP 429 responses are reported in non-production sandboxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleDiagnostics {
	/// Never report throttling beyond the regular call record.
	Disabled,
	/// Report throttling as a warning.
	Warn,
	#[default]
	/// Report throttling as an error, so developers notice while testing.
	Error,
}

/// Settings applied to every call chain driven by an executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallSettings {
	/// Default per-attempt timeout.
	pub http_timeout: Duration,
	/// Floor applied to every computed attempt timeout.
	pub min_http_timeout: Duration,
	/// Fixed timeout for long calls (large uploads/downloads); bypasses the window.
	pub long_http_timeout: Duration,
	/// Delay hint forwarded to transports that retry transient failures themselves.
	///
	/// Never below [`Self::MIN_HTTP_RETRY_DELAY`] once deserialized or handed to an executor.
	#[serde(deserialize_with = "deserialize_retry_delay")]
	pub http_retry_delay: Duration,
	/// Rolling budget spanning an attempt plus its one auth retry.
	pub http_timeout_window: Duration,
	/// Whether descriptors get contract-version, content-type, and locale headers.
	pub add_default_headers: bool,
	/// Value of the `x-xbl-contract-version` default header.
	pub contract_version: String,
	/// Value of the `Accept-Language` default header.
	pub locale: String,
	/// Optional suffix appended to the `User-Agent` header.
	pub user_agent_suffix: Option<String>,
	/// Active sandbox; anything other than [`RETAIL_SANDBOX`] is a development sandbox.
	pub sandbox: String,
	/// Reporting policy for HTTP 429 responses in development sandboxes.
	pub throttle_diagnostics: ThrottleDiagnostics,
	/// Fail calls without a network attempt while a recorded throttle outlasts the window.
	pub fast_fail_throttled: bool,
}
impl CallSettings {
	/// Default per-attempt timeout.
	pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::seconds(30);
	/// Default floor for computed attempt timeouts.
	pub const DEFAULT_MIN_HTTP_TIMEOUT: Duration = Duration::seconds(5);
	/// Default long-call timeout.
	pub const DEFAULT_LONG_HTTP_TIMEOUT: Duration = Duration::minutes(5);
	/// Default retry delay hint.
	pub const DEFAULT_HTTP_RETRY_DELAY: Duration = Duration::seconds(2);
	/// Smallest accepted retry delay hint; lower values are clamped up.
	pub const MIN_HTTP_RETRY_DELAY: Duration = Duration::seconds(2);
	/// Default rolling timeout window.
	pub const DEFAULT_HTTP_TIMEOUT_WINDOW: Duration = Duration::seconds(20);

	/// Returns a builder seeded with default values.
	pub fn builder() -> CallSettingsBuilder {
		CallSettingsBuilder::default()
	}

	/// Returns `true` when the active sandbox is not the production sandbox.
	pub fn is_development_sandbox(&self) -> bool {
		!self.sandbox.eq_ignore_ascii_case(RETAIL_SANDBOX)
	}

	/// Validates invariants for the settings.
	pub fn validate(&self) -> Result<(), ConfigError> {
		ensure_positive("http_timeout", self.http_timeout)?;
		ensure_positive("min_http_timeout", self.min_http_timeout)?;
		ensure_positive("long_http_timeout", self.long_http_timeout)?;
		ensure_positive("http_timeout_window", self.http_timeout_window)?;

		if self.min_http_timeout > self.http_timeout {
			return Err(ConfigError::MinTimeoutExceedsDefault);
		}
		if self.sandbox.trim().is_empty() {
			return Err(ConfigError::EmptySandbox);
		}

		Ok(())
	}

	/// Level at which HTTP 429 responses are reported, or `None` when they stay quiet.
	///
	/// Reports only happen in development sandboxes and never under
	/// [`ThrottleDiagnostics::Disabled`].
	pub fn throttle_report_level(&self) -> Option<ThrottleDiagnostics> {
		match self.throttle_diagnostics {
			ThrottleDiagnostics::Disabled => None,
			_ if !self.is_development_sandbox() => None,
			level => Some(level),
		}
	}

	/// Sets the retry delay hint, clamping it to [`Self::MIN_HTTP_RETRY_DELAY`].
	pub fn set_http_retry_delay(&mut self, delay: Duration) {
		self.http_retry_delay = delay.max(Self::MIN_HTTP_RETRY_DELAY);
	}
}
impl Default for CallSettings {
	fn default() -> Self {
		Self {
			http_timeout: Self::DEFAULT_HTTP_TIMEOUT,
			min_http_timeout: Self::DEFAULT_MIN_HTTP_TIMEOUT,
			long_http_timeout: Self::DEFAULT_LONG_HTTP_TIMEOUT,
			http_retry_delay: Self::DEFAULT_HTTP_RETRY_DELAY,
			http_timeout_window: Self::DEFAULT_HTTP_TIMEOUT_WINDOW,
			add_default_headers: true,
			contract_version: "1".into(),
			locale: "en-US".into(),
			user_agent_suffix: None,
			sandbox: RETAIL_SANDBOX.into(),
			throttle_diagnostics: ThrottleDiagnostics::default(),
			fast_fail_throttled: false,
		}
	}
}

/// Builder for [`CallSettings`] values.
#[derive(Debug, Default)]
pub struct CallSettingsBuilder {
	settings: CallSettings,
}
impl CallSettingsBuilder {
	/// Sets the default per-attempt timeout.
	pub fn http_timeout(mut self, timeout: Duration) -> Self {
		self.settings.http_timeout = timeout;

		self
	}

	/// Sets the floor applied to computed attempt timeouts.
	pub fn min_http_timeout(mut self, timeout: Duration) -> Self {
		self.settings.min_http_timeout = timeout;

		self
	}

	/// Sets the fixed timeout used by long calls.
	pub fn long_http_timeout(mut self, timeout: Duration) -> Self {
		self.settings.long_http_timeout = timeout;

		self
	}

	/// Sets the retry delay hint (clamped to the minimum floor).
	pub fn http_retry_delay(mut self, delay: Duration) -> Self {
		self.settings.set_http_retry_delay(delay);

		self
	}

	/// Sets the rolling timeout window.
	pub fn http_timeout_window(mut self, window: Duration) -> Self {
		self.settings.http_timeout_window = window;

		self
	}

	/// Toggles the default contract-version, content-type, and locale headers.
	pub fn add_default_headers(mut self, enabled: bool) -> Self {
		self.settings.add_default_headers = enabled;

		self
	}

	/// Overrides the default contract version header value.
	pub fn contract_version(mut self, version: impl Into<String>) -> Self {
		self.settings.contract_version = version.into();

		self
	}

	/// Overrides the `Accept-Language` header value.
	pub fn locale(mut self, locale: impl Into<String>) -> Self {
		self.settings.locale = locale.into();

		self
	}

	/// Appends a suffix to the `User-Agent` header.
	pub fn user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
		self.settings.user_agent_suffix = Some(suffix.into());

		self
	}

	/// Sets the active sandbox.
	pub fn sandbox(mut self, sandbox: impl Into<String>) -> Self {
		self.settings.sandbox = sandbox.into();

		self
	}

	/// Sets how HTTP 429 responses are reported in development sandboxes.
	pub fn throttle_diagnostics(mut self, policy: ThrottleDiagnostics) -> Self {
		self.settings.throttle_diagnostics = policy;

		self
	}

	/// Enables failing calls fast while a recorded throttle outlasts the timeout window.
	pub fn fast_fail_throttled(mut self, enabled: bool) -> Self {
		self.settings.fast_fail_throttled = enabled;

		self
	}

	/// Consumes the builder and validates the resulting settings.
	pub fn build(self) -> Result<CallSettings, ConfigError> {
		self.settings.validate()?;

		Ok(self.settings)
	}
}

fn deserialize_retry_delay<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Duration::deserialize(deserializer)?.max(CallSettings::MIN_HTTP_RETRY_DELAY))
}

fn ensure_positive(setting: &'static str, value: Duration) -> Result<(), ConfigError> {
	if value.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveDuration { setting }) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_validate() {
		let settings = CallSettings::default();

		assert!(settings.validate().is_ok());
		assert_eq!(settings.http_timeout, Duration::seconds(30));
		assert_eq!(settings.http_timeout_window, Duration::seconds(20));
		assert!(!settings.is_development_sandbox());
	}

	#[test]
	fn retry_delay_is_clamped_to_floor() {
		let settings = CallSettings::builder()
			.http_retry_delay(Duration::milliseconds(250))
			.build()
			.expect("Clamped retry delay should validate.");

		assert_eq!(settings.http_retry_delay, CallSettings::MIN_HTTP_RETRY_DELAY);

		let settings = CallSettings::builder()
			.http_retry_delay(Duration::seconds(7))
			.build()
			.expect("Larger retry delay should validate.");

		assert_eq!(settings.http_retry_delay, Duration::seconds(7));
	}

	#[test]
	fn builder_rejects_inverted_timeouts() {
		let err = CallSettings::builder()
			.http_timeout(Duration::seconds(3))
			.min_http_timeout(Duration::seconds(5))
			.build()
			.expect_err("A floor above the default timeout must be rejected.");

		assert_eq!(err, ConfigError::MinTimeoutExceedsDefault);

		let err = CallSettings::builder()
			.http_timeout_window(Duration::ZERO)
			.build()
			.expect_err("A zero window must be rejected.");

		assert_eq!(err, ConfigError::NonPositiveDuration { setting: "http_timeout_window" });
	}

	#[test]
	fn sandbox_comparison_ignores_case() {
		let retail = CallSettings::builder().sandbox("retail").build().expect("Valid sandbox.");
		let dev = CallSettings::builder().sandbox("XDKS.1").build().expect("Valid sandbox.");

		assert!(!retail.is_development_sandbox());
		assert!(dev.is_development_sandbox());
		assert_eq!(
			CallSettings::builder().sandbox("  ").build(),
			Err(ConfigError::EmptySandbox)
		);
	}

	#[test]
	fn throttle_reports_only_in_development_sandboxes() {
		let level = |sandbox: &str, policy| {
			CallSettings::builder()
				.sandbox(sandbox)
				.throttle_diagnostics(policy)
				.build()
				.expect("Valid settings.")
				.throttle_report_level()
		};

		assert_eq!(level("RETAIL", ThrottleDiagnostics::Error), None);
		assert_eq!(level("Retail", ThrottleDiagnostics::Warn), None);
		assert_eq!(level("XDKS.1", ThrottleDiagnostics::Disabled), None);
		assert_eq!(level("XDKS.1", ThrottleDiagnostics::Warn), Some(ThrottleDiagnostics::Warn));
		assert_eq!(level("XDKS.1", ThrottleDiagnostics::Error), Some(ThrottleDiagnostics::Error));
	}

	#[test]
	fn partial_json_falls_back_to_defaults() {
		let settings: CallSettings =
			serde_json::from_str(r#"{"sandbox":"XDKS.1","throttle_diagnostics":"warn"}"#)
				.expect("Partial settings should deserialize.");

		assert_eq!(settings.sandbox, "XDKS.1");
		assert_eq!(settings.throttle_diagnostics, ThrottleDiagnostics::Warn);
		assert_eq!(settings.http_timeout, CallSettings::DEFAULT_HTTP_TIMEOUT);
		assert_eq!(settings.http_retry_delay, CallSettings::DEFAULT_HTTP_RETRY_DELAY);
	}

	#[test]
	fn deserialized_retry_delay_is_clamped_to_floor() {
		let short: CallSettings = serde_json::from_str(
			&serde_json::json!({ "http_retry_delay": Duration::milliseconds(10) }).to_string(),
		)
		.expect("Short retry delay should deserialize.");
		let long: CallSettings = serde_json::from_str(
			&serde_json::json!({ "http_retry_delay": Duration::seconds(9) }).to_string(),
		)
		.expect("Long retry delay should deserialize.");

		assert_eq!(short.http_retry_delay, CallSettings::MIN_HTTP_RETRY_DELAY);
		assert_eq!(long.http_retry_delay, Duration::seconds(9));
	}
}
