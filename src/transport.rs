//! Transport contract between the executor and an HTTP stack.
//!
//! The executor hands each network attempt to a [`Transport`] as an owned [`TransportRequest`]
//! snapshot that already carries the budgeted per-attempt timeout. Implementations perform
//! exactly one attempt and report either the raw response (any status) or a
//! [`TransportError`]. HTTP status interpretation stays in the executor.

#[cfg(feature = "reqwest")] pub mod reqwest;
#[cfg(feature = "reqwest")] pub use self::reqwest::ReqwestTransport;

// self
use crate::{
	_prelude::*,
	call::{CallDescriptor, HeaderSet, RequestBody},
	config::CallSettings,
	error::TransportError,
};

/// Boxed future returned by [`Transport::perform`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// HTTP stack able to perform one attempt of a call.
///
/// Implementations must be `Send + Sync + 'static` so executors can share them behind `Arc`
/// across concurrent call chains.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Performs one attempt. Must honor [`TransportRequest::timeout`].
	fn perform(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Owned snapshot of one network attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: String,
	/// Absolute request URL.
	pub url: Url,
	/// Headers, including any attached auth headers.
	pub headers: HeaderSet,
	/// Request payload.
	pub body: RequestBody,
	/// Budgeted timeout for this attempt.
	pub timeout: Duration,
	/// Whether the caller allows retries; a hint for transports with their own retry layer.
	pub retry_allowed: bool,
	/// Delay hint between transport-level retries.
	pub retry_delay: Duration,
	/// Rolling window the attempt belongs to.
	pub timeout_window: Duration,
}
impl TransportRequest {
	/// Snapshots `descriptor` for an attempt bounded by `timeout`.
	pub fn from_descriptor(
		descriptor: &CallDescriptor,
		settings: &CallSettings,
		timeout: Duration,
	) -> Self {
		Self {
			method: descriptor.method().into(),
			url: descriptor.url().clone(),
			headers: descriptor.headers().clone(),
			body: descriptor.body().clone(),
			timeout,
			retry_allowed: descriptor.retry_allowed(),
			retry_delay: settings.http_retry_delay,
			timeout_window: settings.http_timeout_window,
		}
	}
}

/// Unclassified HTTP response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderSet,
	/// Response body.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Creates a response with `status`, no headers, and no body.
	pub fn new(status: u16) -> Self {
		Self { status, ..Default::default() }
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::call::XboxLiveApi;

	#[test]
	fn snapshot_carries_descriptor_and_hints() {
		let settings = CallSettings::default();
		let descriptor = CallDescriptor::new(
			&settings,
			"POST",
			"https://titlestorage.xboxlive.com/json/users/xuid(1)/storage",
			XboxLiveApi::UploadBlob,
		)
		.expect("Descriptor should build.")
		.with_retry_allowed(false)
		.with_body("{}");
		let request =
			TransportRequest::from_descriptor(&descriptor, &settings, Duration::seconds(9));

		assert_eq!(request.method, "POST");
		assert_eq!(request.url.host_str(), Some("titlestorage.xboxlive.com"));
		assert_eq!(request.headers, *descriptor.headers());
		assert_eq!(request.body, RequestBody::Text("{}".into()));
		assert_eq!(request.timeout, Duration::seconds(9));
		assert!(!request.retry_allowed);
		assert_eq!(request.retry_delay, settings.http_retry_delay);
		assert_eq!(request.timeout_window, settings.http_timeout_window);
	}
}
