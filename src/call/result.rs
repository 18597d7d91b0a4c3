//! Call outcomes and HTTP status classification.

// std
use std::borrow::Cow;
// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	call::HeaderSet,
	error::ErrorKind,
	throttle::payload,
	transport::RawResponse,
};

/// Largest number of response-body bytes quoted in error messages.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Final outcome of one logical call chain.
///
/// `http_status` is `0` whenever the chain completed before any response arrived (auth failure,
/// malformed request, transport failure, cancellation, fast-failed throttle).
#[derive(Debug, Default)]
pub struct CallResult {
	/// HTTP status of the last response, or `0` when no response arrived.
	pub http_status: u16,
	/// Classified error; `None` for 2xx and other non-error statuses.
	pub error: Option<Error>,
	/// Retry-After hint from the last response.
	pub retry_after: Option<Duration>,
	/// Headers of the last response.
	pub response_headers: HeaderSet,
	/// Body of the last response.
	pub response_body: Vec<u8>,
	/// Number of network attempts the chain dispatched.
	pub attempts: u32,
	/// Wall time from executor entry to completion, including token acquisition.
	pub elapsed: Duration,
}
impl CallResult {
	/// Builds a result for a chain that failed before a response arrived.
	pub fn failed(error: impl Into<Error>) -> Self {
		Self { error: Some(error.into()), ..Default::default() }
	}

	/// Builds a result from a raw response, classifying its status.
	pub fn from_response(response: RawResponse) -> Self {
		let retry_after = parse_retry_after(&response.headers);
		let error = classify_status(response.status, retry_after, &response.body);

		Self {
			http_status: response.status,
			error,
			retry_after,
			response_headers: response.headers,
			response_body: response.body,
			..Default::default()
		}
	}

	/// Returns `true` when no error was recorded.
	pub fn is_success(&self) -> bool {
		self.error.is_none()
	}

	/// Returns the flat error classification, if any.
	pub fn error_kind(&self) -> Option<ErrorKind> {
		self.error.as_ref().map(Error::kind)
	}

	/// Returns the response body as text, replacing invalid UTF-8 sequences.
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.response_body)
	}
}

/// Maps an HTTP status to the pipeline error taxonomy.
///
/// Statuses below 300 or at/above 600 are not errors; 429 is [`Error::Throttled`]; everything
/// else is [`Error::HttpStatus`] with a bounded body preview in its message.
pub fn classify_status(status: u16, retry_after: Option<Duration>, body: &[u8]) -> Option<Error> {
	match status {
		429 => {
			let message = payload::throttle_message(body, retry_after)
				.unwrap_or_else(|| format!("HTTP 429 Too Many Requests{}", body_preview(body)));

			Some(Error::Throttled { retry_after, message })
		},
		300..=599 => Some(Error::HttpStatus {
			status,
			retry_after,
			message: format!("HTTP {status}{}", body_preview(body)),
		}),
		_ => None,
	}
}

/// Parses a `Retry-After` header expressed in seconds or as an RFC 2822 date.
pub fn parse_retry_after(headers: &HeaderSet) -> Option<Duration> {
	let raw = headers.get("Retry-After")?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

fn body_preview(body: &[u8]) -> String {
	if body.is_empty() {
		return String::new();
	}

	let cut = body.len().min(BODY_PREVIEW_LIMIT);
	let text = String::from_utf8_lossy(&body[..cut]);
	let ellipsis = if body.len() > BODY_PREVIEW_LIMIT { "..." } else { "" };

	format!(": {}{ellipsis}", text.trim())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn statuses_below_300_and_above_599_are_not_errors() {
		for status in [100, 200, 204, 299, 600, 999] {
			assert!(classify_status(status, None, b"").is_none(), "status {status}");
		}
	}

	#[test]
	fn throttled_and_http_errors_are_distinguished() {
		let throttled = classify_status(429, Some(Duration::seconds(4)), b"")
			.expect("429 should be an error.");

		assert_eq!(throttled.kind(), ErrorKind::Throttled);

		let missing = classify_status(404, None, b"{\"code\":\"NotFound\"}")
			.expect("404 should be an error.");

		assert_eq!(missing.kind(), ErrorKind::HttpStatusError);
		assert_eq!(missing.to_string(), "HTTP 404: {\"code\":\"NotFound\"}");
	}

	#[test]
	fn body_preview_is_bounded() {
		let body = vec![b'x'; BODY_PREVIEW_LIMIT * 2];
		let err = classify_status(500, None, &body).expect("500 should be an error.");
		let message = err.to_string();

		assert!(message.ends_with("..."));
		assert!(message.len() < BODY_PREVIEW_LIMIT + 32);
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let mut headers = HeaderSet::new();

		headers.insert("retry-after", "12");

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(12)));

		let future = OffsetDateTime::now_utc() + Duration::minutes(5);

		headers.insert("Retry-After", future.format(&Rfc2822).expect("Date should format."));

		let parsed = parse_retry_after(&headers).expect("Future date should parse.");

		assert!(parsed > Duration::minutes(4) && parsed <= Duration::minutes(5));

		headers.insert("Retry-After", "soon");

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn from_response_keeps_headers_and_body() {
		let response = RawResponse::new(503)
			.with_header("Retry-After", "3")
			.with_body(b"busy".to_vec());
		let result = CallResult::from_response(response);

		assert_eq!(result.http_status, 503);
		assert_eq!(result.retry_after, Some(Duration::seconds(3)));
		assert_eq!(result.error_kind(), Some(ErrorKind::HttpStatusError));
		assert_eq!(result.body_text(), "busy");
		assert_eq!(result.attempts, 0);
	}
}
