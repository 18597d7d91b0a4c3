//! States of one call chain.

// self
use crate::{call::{CallDescriptor, CallResult}, transport::TransportRequest};

/// HTTP status that makes a chain eligible for the auth retry.
pub const UNAUTHORIZED: u16 = 401;

/// Explicit state of a call chain.
///
/// ```text
/// Created -> AttachingAuth -> Executing -> AwaitingResponse -> Completed
/// Created -> Executing
/// AwaitingResponse -> RetryingAfterAuthFailure -> Executing
/// ```
///
/// Any state may move straight to `Completed` on failure or cancellation.
#[derive(Debug)]
pub enum CallState {
	/// Descriptor accepted; nothing done yet.
	Created,
	/// Waiting on the auth provider for a token.
	AttachingAuth,
	/// Budgeting the timeout and snapshotting the next attempt.
	Executing,
	/// Attempt dispatched to the transport.
	AwaitingResponse(TransportRequest),
	/// A 401 arrived and the single token refresh is in flight; holds the 401 result.
	RetryingAfterAuthFailure(CallResult),
	/// Terminal.
	Completed(CallResult),
}
impl CallState {
	/// Returns a stable label suitable for log fields.
	pub const fn name(&self) -> &'static str {
		match self {
			CallState::Created => "created",
			CallState::AttachingAuth => "attaching_auth",
			CallState::Executing => "executing",
			CallState::AwaitingResponse(_) => "awaiting_response",
			CallState::RetryingAfterAuthFailure(_) => "retrying_after_auth_failure",
			CallState::Completed(_) => "completed",
		}
	}

	/// Returns `true` for [`CallState::Completed`].
	pub const fn is_terminal(&self) -> bool {
		matches!(self, CallState::Completed(_))
	}
}

/// State entered after auth attachment is skipped or not required.
pub fn after_created(descriptor: &CallDescriptor) -> CallState {
	if descriptor.requires_auth() { CallState::AttachingAuth } else { CallState::Executing }
}

/// Returns `true` when a response with `status` may trigger the single auth retry.
pub fn auth_retry_eligible(status: u16, descriptor: &CallDescriptor, has_provider: bool) -> bool {
	status == UNAUTHORIZED
		&& descriptor.retry_allowed()
		&& has_provider
		&& !descriptor.has_retried_on_auth_failure()
}
