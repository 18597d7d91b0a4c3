// self
use crate::{
	call::{CallResult, XboxLiveApi},
	obs::CallOutcome,
};

/// Counts a call chain entering the executor.
pub fn record_call_started(api: XboxLiveApi) {
	increment_call_total(api, CallOutcome::Attempt);
}

/// Counts a completed call chain under the outcome derived from `result`.
///
/// Throttled completions also bump `xbl_http_throttled_total`, whether the 429 came from the
/// service or from a fast-failed throttle.
pub fn record_call_finished(api: XboxLiveApi, result: &CallResult) -> CallOutcome {
	let outcome = CallOutcome::of(result);

	increment_call_total(api, outcome);

	#[cfg(feature = "metrics")]
	{
		if outcome == CallOutcome::Throttled {
			metrics::counter!("xbl_http_throttled_total", "api" => api.as_str()).increment(1);
		}
	}

	outcome
}

fn increment_call_total(api: XboxLiveApi, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"xbl_http_call_total",
			"api" => api.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (api, outcome);
	}
}
