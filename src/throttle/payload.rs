//! Debug payload returned alongside HTTP 429 responses.

// self
use crate::_prelude::*;

/// Deserialization failure carrying the JSON path of the offending field.
pub type PayloadError = serde_path_to_error::Error<serde_json::Error>;

/// Rate-limit details some services include in the body of a 429.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottlePayload {
	/// Limit kind; only `"Rate"` payloads are summarized.
	pub limit_type: String,
	/// Requests counted in the current period.
	pub current_requests: u32,
	/// Requests allowed per period.
	pub max_requests: u32,
	/// Length of the rate-limit period.
	pub period_in_seconds: u32,
}

/// Parses a throttle payload, reporting the JSON path of the first mismatch on failure.
pub fn parse(body: &[u8]) -> Result<ThrottlePayload, PayloadError> {
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
}

/// Builds a human-readable summary of a 429 payload.
///
/// Returns `None` unless the payload is a well-formed `"Rate"` limit with positive counters.
pub fn throttle_message(body: &[u8], retry_after: Option<Duration>) -> Option<String> {
	let payload = parse(body).ok()?;

	if payload.limit_type != "Rate"
		|| payload.current_requests == 0
		|| payload.max_requests == 0
		|| payload.period_in_seconds == 0
	{
		return None;
	}

	let mut message = format!(
		"Too many requests sent. {} of {} in {} seconds.",
		payload.current_requests, payload.max_requests, payload.period_in_seconds
	);

	if let Some(hint) = retry_after.filter(|hint| hint.whole_seconds() > 0) {
		message.push_str(&format!(" Retry after {} seconds.", hint.whole_seconds()));
	}

	Some(message)
}
