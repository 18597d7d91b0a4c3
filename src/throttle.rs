//! Process-wide throttle tracking keyed by logical API id.
//!
//! Every HTTP 429 observed by an executor is recorded here so later calls (and callers) can see
//! that an API is being throttled. The registry is a single map behind one lock; reads hand out
//! copies so no caller ever holds the lock across an await point.

pub mod payload;

// std
use std::sync::OnceLock;
// self
use crate::{_prelude::*, call::XboxLiveApi};

static GLOBAL: OnceLock<Arc<ThrottleRegistry>> = OnceLock::new();

/// Last throttle observation for an API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleState {
	/// Logical API that was throttled.
	pub api: XboxLiveApi,
	/// When the 429 response was observed.
	pub observed_at: OffsetDateTime,
	/// Retry-After hint supplied with the 429, if any.
	pub retry_after: Option<Duration>,
	/// Human-readable summary of the throttle payload, if any.
	pub message: Option<String>,
}
impl ThrottleState {
	/// Creates a state observed at `observed_at` with no hint or message.
	pub fn new(api: XboxLiveApi, observed_at: OffsetDateTime) -> Self {
		Self { api, observed_at, retry_after: None, message: None }
	}

	/// Attaches the server's Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Attaches a human-readable throttle summary.
	pub fn with_message(mut self, message: Option<String>) -> Self {
		self.message = message;

		self
	}

	/// Instant after which the server allows calls again, when a hint was supplied.
	pub fn retry_at(&self) -> Option<OffsetDateTime> {
		self.retry_after.map(|hint| self.observed_at + hint)
	}

	/// Returns `true` when the Retry-After deadline lies after `now`.
	pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
		self.retry_at().is_some_and(|deadline| deadline > now)
	}
}

/// Map from logical API id to its most recent [`ThrottleState`].
#[derive(Debug, Default)]
pub struct ThrottleRegistry {
	states: Mutex<HashMap<XboxLiveApi, ThrottleState>>,
}
impl ThrottleRegistry {
	/// Returns the process-wide registry, creating it on first use.
	pub fn global() -> Arc<ThrottleRegistry> {
		GLOBAL.get_or_init(Default::default).clone()
	}

	/// Records `state` for `api`, replacing any previous observation.
	pub fn set_state(&self, api: XboxLiveApi, state: ThrottleState) {
		self.states.lock().insert(api, state);
	}

	/// Returns a copy of the observation for `api`; `None` means no known throttling.
	pub fn get_state(&self, api: XboxLiveApi) -> Option<ThrottleState> {
		self.states.lock().get(&api).cloned()
	}

	/// Forgets any observation for `api`.
	pub fn clear_state(&self, api: XboxLiveApi) {
		self.states.lock().remove(&api);
	}

	/// Removes every observation whose Retry-After deadline has passed at `now`.
	pub fn clear_expired(&self, now: OffsetDateTime) {
		self.states
			.lock()
			.retain(|_, state| state.retry_at().is_none_or(|deadline| deadline > now));
	}

	/// Returns the number of APIs with a recorded observation.
	pub fn len(&self) -> usize {
		self.states.lock().len()
	}

	/// Returns `true` when nothing is recorded.
	pub fn is_empty(&self) -> bool {
		self.states.lock().is_empty()
	}
}
