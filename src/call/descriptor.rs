//! Request configuration for one logical call chain.
//!
//! A [`CallDescriptor`] is created once per logical call, moved into the executor, and reused by
//! the single auth retry. Everything the caller controls is fixed before execution; the executor
//! owns the small amount of mutable retry and timing state.

// std
use std::time::Instant;
// self
use crate::{_prelude::*, call::{HeaderSet, XboxLiveApi}, config::CallSettings};

/// Header carrying the service contract version.
pub const CONTRACT_VERSION_HEADER: &str = "x-xbl-contract-version";
/// Header carrying the auth token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "Signature";
/// Content type attached by default.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Prefix of the `User-Agent` header.
pub const USER_AGENT_PREFIX: &str = "XboxServicesAPI/";

/// Request payload; text and bytes are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
	#[default]
	/// No payload.
	None,
	/// UTF-8 text payload.
	Text(String),
	/// Binary payload.
	Bytes(Vec<u8>),
}
impl RequestBody {
	/// Returns the payload as raw bytes.
	pub fn as_bytes(&self) -> &[u8] {
		match self {
			RequestBody::None => &[],
			RequestBody::Text(text) => text.as_bytes(),
			RequestBody::Bytes(bytes) => bytes,
		}
	}

	/// Returns `true` for [`RequestBody::None`].
	pub fn is_none(&self) -> bool {
		matches!(self, RequestBody::None)
	}
}
impl From<String> for RequestBody {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&str> for RequestBody {
	fn from(value: &str) -> Self {
		Self::Text(value.into())
	}
}
impl From<Vec<u8>> for RequestBody {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(value)
	}
}

/// Immutable request configuration plus the executor-owned retry and timing state.
#[derive(Clone, Debug)]
pub struct CallDescriptor {
	method: String,
	url: Url,
	api: XboxLiveApi,
	headers: HeaderSet,
	body: RequestBody,
	retry_allowed: bool,
	long_call: bool,
	requires_auth: bool,
	all_users_auth_required: bool,
	has_retried_on_auth_failure: bool,
	first_attempt_at: Option<Instant>,
	current_attempt_at: Option<Instant>,
	attempts: u32,
}
impl CallDescriptor {
	/// Creates a descriptor for `method` + `url`, attaching the configured default headers.
	///
	/// Fails with [`Error::InvalidArgument`] when the method is empty or the URL is empty or not
	/// absolute.
	pub fn new(
		settings: &CallSettings,
		method: &str,
		url: &str,
		api: XboxLiveApi,
	) -> Result<Self> {
		let method = method.trim();
		let url = url.trim();

		if method.is_empty() {
			return Err(Error::invalid_argument("HTTP method cannot be empty"));
		}
		if url.is_empty() {
			return Err(Error::invalid_argument("request URL cannot be empty"));
		}

		let url = Url::parse(url)
			.map_err(|e| Error::invalid_argument(format!("request URL is invalid ({e})")))?;
		let mut headers = HeaderSet::new();

		if settings.add_default_headers {
			headers.insert(CONTRACT_VERSION_HEADER, settings.contract_version.as_str());
			headers.insert("Content-Type", DEFAULT_CONTENT_TYPE);
			headers.insert("Accept-Language", settings.locale.as_str());
		}

		let mut user_agent = format!("{USER_AGENT_PREFIX}{}", env!("CARGO_PKG_VERSION"));

		if let Some(suffix) = settings.user_agent_suffix.as_deref().filter(|s| !s.is_empty()) {
			user_agent.push(' ');
			user_agent.push_str(suffix);
		}

		headers.insert("User-Agent", user_agent);

		Ok(Self {
			method: method.to_ascii_uppercase(),
			url,
			api,
			headers,
			body: RequestBody::None,
			retry_allowed: true,
			long_call: false,
			requires_auth: true,
			all_users_auth_required: false,
			has_retried_on_auth_failure: false,
			first_attempt_at: None,
			current_attempt_at: None,
			attempts: 0,
		})
	}

	/// Replaces the payload.
	pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
		self.body = body.into();

		self
	}

	/// Sets or replaces a custom header (names compare case-insensitively).
	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.headers.insert(name, value);
	}

	/// Builder-style variant of [`CallDescriptor::set_header`].
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_header(name, value);

		self
	}

	/// Overrides the contract version header for this call only.
	pub fn with_contract_version(self, version: impl Into<String>) -> Self {
		self.with_header(CONTRACT_VERSION_HEADER, version)
	}

	/// Allows or forbids the single retry after an authorization failure.
	pub fn with_retry_allowed(mut self, allowed: bool) -> Self {
		self.retry_allowed = allowed;

		self
	}

	/// Marks the call as long-running (fixed long timeout, no window budget).
	pub fn with_long_call(mut self, long_call: bool) -> Self {
		self.long_call = long_call;

		self
	}

	/// Toggles token attachment.
	pub fn with_requires_auth(mut self, requires_auth: bool) -> Self {
		self.requires_auth = requires_auth;

		self
	}

	/// Requests a token that authorizes every signed-in user.
	pub fn with_all_users_auth_required(mut self, required: bool) -> Self {
		self.all_users_auth_required = required;

		self
	}

	/// HTTP method, upper-cased.
	pub fn method(&self) -> &str {
		&self.method
	}

	/// Absolute request URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Logical API id used as the throttle key.
	pub fn api(&self) -> XboxLiveApi {
		self.api
	}

	/// Current request headers.
	pub fn headers(&self) -> &HeaderSet {
		&self.headers
	}

	/// Request payload.
	pub fn body(&self) -> &RequestBody {
		&self.body
	}

	/// Whether one retry after an authorization failure is permitted.
	pub fn retry_allowed(&self) -> bool {
		self.retry_allowed
	}

	/// Whether the call uses the long-call timeout.
	pub fn long_call(&self) -> bool {
		self.long_call
	}

	/// Whether a token must be attached before dispatch.
	pub fn requires_auth(&self) -> bool {
		self.requires_auth
	}

	/// Whether the token must authorize every signed-in user.
	pub fn all_users_auth_required(&self) -> bool {
		self.all_users_auth_required
	}

	/// Whether the single auth retry has been consumed.
	pub fn has_retried_on_auth_failure(&self) -> bool {
		self.has_retried_on_auth_failure
	}

	/// Instant of the first network attempt, once dispatched.
	pub fn first_attempt_at(&self) -> Option<Instant> {
		self.first_attempt_at
	}

	/// Instant of the most recent network attempt, once dispatched.
	pub fn current_attempt_at(&self) -> Option<Instant> {
		self.current_attempt_at
	}

	/// Number of network attempts dispatched so far.
	pub fn attempts(&self) -> u32 {
		self.attempts
	}

	/// Time spent since the first attempt, or zero before any dispatch.
	pub fn elapsed_at(&self, now: Instant) -> Duration {
		self.first_attempt_at
			.map(|first| {
				Duration::try_from(now.saturating_duration_since(first)).unwrap_or(Duration::MAX)
			})
			.unwrap_or(Duration::ZERO)
	}

	pub(crate) fn headers_mut(&mut self) -> &mut HeaderSet {
		&mut self.headers
	}

	/// Consumes the auth retry; returns `false` when it was already used.
	pub(crate) fn mark_auth_retry(&mut self) -> bool {
		if self.has_retried_on_auth_failure {
			return false;
		}

		self.has_retried_on_auth_failure = true;

		true
	}

	pub(crate) fn begin_attempt(&mut self, now: Instant) {
		self.first_attempt_at.get_or_insert(now);
		self.current_attempt_at = Some(now);
		self.attempts += 1;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn settings() -> CallSettings {
		CallSettings::default()
	}

	#[test]
	fn new_attaches_default_headers() {
		let descriptor = CallDescriptor::new(
			&settings(),
			"get",
			"https://leaderboards.xboxlive.com/scids/1/leaderboards/2",
			XboxLiveApi::GetLeaderboard,
		)
		.expect("Descriptor should build.");

		assert_eq!(descriptor.method(), "GET");
		assert_eq!(descriptor.headers().get(CONTRACT_VERSION_HEADER), Some("1"));
		assert_eq!(descriptor.headers().get("content-type"), Some(DEFAULT_CONTENT_TYPE));
		assert_eq!(descriptor.headers().get("accept-language"), Some("en-US"));
		assert!(
			descriptor
				.headers()
				.get("user-agent")
				.is_some_and(|ua| ua.starts_with(USER_AGENT_PREFIX))
		);
		assert!(descriptor.retry_allowed());
		assert!(descriptor.requires_auth());
		assert!(!descriptor.long_call());
		assert!(!descriptor.has_retried_on_auth_failure());
		assert_eq!(descriptor.attempts(), 0);
	}

	#[test]
	fn default_headers_can_be_disabled() {
		let settings = CallSettings::builder()
			.add_default_headers(false)
			.user_agent_suffix("title/7")
			.build()
			.expect("Settings should validate.");
		let descriptor =
			CallDescriptor::new(&settings, "POST", "https://example.com/x", XboxLiveApi::default())
				.expect("Descriptor should build.");

		assert!(!descriptor.headers().contains(CONTRACT_VERSION_HEADER));
		assert_eq!(descriptor.headers().len(), 1);
		assert!(
			descriptor.headers().get("User-Agent").is_some_and(|ua| ua.ends_with(" title/7"))
		);
	}

	#[test]
	fn rejects_empty_method_and_bad_urls() {
		for (method, url) in [("", "https://example.com"), ("GET", " "), ("GET", "not a url")] {
			let err = CallDescriptor::new(&settings(), method, url, XboxLiveApi::Unspecified)
				.expect_err("Malformed descriptor input must be rejected.");

			assert!(matches!(err, Error::InvalidArgument { .. }), "{method:?} {url:?}: {err:?}");
		}
	}

	#[test]
	fn custom_headers_replace_defaults() {
		let descriptor =
			CallDescriptor::new(&settings(), "GET", "https://example.com", XboxLiveApi::GetQuota)
				.expect("Descriptor should build.")
				.with_contract_version("5")
				.with_header("CONTENT-TYPE", "application/octet-stream");

		assert_eq!(descriptor.headers().get(CONTRACT_VERSION_HEADER), Some("5"));
		assert_eq!(descriptor.headers().get("content-type"), Some("application/octet-stream"));
		assert_eq!(descriptor.headers().len(), 4);
	}

	#[test]
	fn body_variants_replace_each_other() {
		let descriptor =
			CallDescriptor::new(&settings(), "PUT", "https://example.com", XboxLiveApi::UploadBlob)
				.expect("Descriptor should build.")
				.with_body("{\"a\":1}")
				.with_body(vec![1_u8, 2, 3]);

		assert_eq!(descriptor.body(), &RequestBody::Bytes(vec![1, 2, 3]));
		assert_eq!(descriptor.body().as_bytes(), &[1, 2, 3]);
	}

	#[test]
	fn auth_retry_flag_flips_once() {
		let mut descriptor =
			CallDescriptor::new(&settings(), "GET", "https://example.com", XboxLiveApi::GetQuota)
				.expect("Descriptor should build.");

		assert!(descriptor.mark_auth_retry());
		assert!(!descriptor.mark_auth_retry());
		assert!(descriptor.has_retried_on_auth_failure());
	}

	#[test]
	fn attempts_keep_first_instant() {
		let mut descriptor =
			CallDescriptor::new(&settings(), "GET", "https://example.com", XboxLiveApi::GetQuota)
				.expect("Descriptor should build.");
		let first = Instant::now();
		let second = first + std::time::Duration::from_secs(3);

		assert_eq!(descriptor.elapsed_at(first), Duration::ZERO);

		descriptor.begin_attempt(first);
		descriptor.begin_attempt(second);

		assert_eq!(descriptor.first_attempt_at(), Some(first));
		assert_eq!(descriptor.current_attempt_at(), Some(second));
		assert_eq!(descriptor.attempts(), 2);
		assert_eq!(descriptor.elapsed_at(second), Duration::seconds(3));
	}
}
