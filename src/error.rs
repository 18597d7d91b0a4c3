//! Pipeline-level error types shared across descriptors, auth providers, and transports.

// self
use crate::_prelude::*;

/// Pipeline-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical call error carried by [`CallResult`](crate::call::CallResult) values.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Descriptor was malformed (empty method, empty or unparsable URL).
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Which part of the request was rejected.
		reason: String,
	},
	/// Authentication failed before any network attempt.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure (timeout, DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Service answered with a non-success status other than 429.
	#[error("{message}")]
	HttpStatus {
		/// Raw HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Summary including a bounded preview of the response body.
		message: String,
	},
	/// Service answered with HTTP 429, or the call was failed fast on a known throttle.
	#[error("{message}")]
	Throttled {
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Summary built from the throttle payload when one was returned.
		message: String,
	},
	/// The caller cancelled the call chain.
	#[error("Call was cancelled before it completed.")]
	Cancelled,
}
impl Error {
	/// Builds an [`Error::InvalidArgument`] from any displayable reason.
	pub fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	/// Returns the flat error classification.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
			Self::Auth(AuthError::UserNotSignedIn) => ErrorKind::AuthUserNotSignedIn,
			Self::Auth(AuthError::TokenFetchFailed { .. }) => ErrorKind::AuthTokenFetchFailed,
			Self::Transport(TransportError::Timeout { .. }) => ErrorKind::TransportTimeout,
			Self::Transport(TransportError::Connection { .. }) =>
				ErrorKind::TransportConnectionFailed,
			Self::Transport(TransportError::InvalidRequest { .. }) => ErrorKind::InvalidArgument,
			Self::HttpStatus { .. } => ErrorKind::HttpStatusError,
			Self::Throttled { .. } => ErrorKind::Throttled,
			Self::Cancelled => ErrorKind::Cancelled,
		}
	}
}

/// Flat classification of [`Error`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	/// Malformed descriptor or request.
	InvalidArgument,
	/// No signed-in user could authorize the call.
	AuthUserNotSignedIn,
	/// The auth provider failed to produce a token.
	AuthTokenFetchFailed,
	/// The attempt exceeded its timeout.
	TransportTimeout,
	/// The connection could not be established or broke.
	TransportConnectionFailed,
	/// Non-success HTTP status other than 429.
	HttpStatusError,
	/// HTTP 429 or a known throttle.
	Throttled,
	/// The call chain was cancelled by the caller.
	Cancelled,
}
impl ErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::InvalidArgument => "invalid_argument",
			ErrorKind::AuthUserNotSignedIn => "auth_user_not_signed_in",
			ErrorKind::AuthTokenFetchFailed => "auth_token_fetch_failed",
			ErrorKind::TransportTimeout => "transport_timeout",
			ErrorKind::TransportConnectionFailed => "transport_connection_failed",
			ErrorKind::HttpStatusError => "http_status_error",
			ErrorKind::Throttled => "throttled",
			ErrorKind::Cancelled => "cancelled",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failures reported by an [`AuthProvider`](crate::auth::AuthProvider).
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No user is signed in, so no token can be issued.
	#[error("User must be signed in to call this API.")]
	UserNotSignedIn,
	/// The provider could not obtain or refresh a token.
	#[error("Auth token could not be fetched: {message}.")]
	TokenFetchFailed {
		/// Provider-supplied summary.
		message: String,
		/// Underlying provider failure, when available.
		#[source]
		source: Option<BoxError>,
	},
}
impl AuthError {
	/// Builds a [`AuthError::TokenFetchFailed`] without an underlying source.
	pub fn token_fetch(message: impl Into<String>) -> Self {
		Self::TokenFetchFailed { message: message.into(), source: None }
	}

	/// Builds a [`AuthError::TokenFetchFailed`] wrapping the provider's own error.
	pub fn token_fetch_with(
		message: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::TokenFetchFailed { message: message.into(), source: Some(Box::new(src)) }
	}
}

/// Transport-level failures (network, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The attempt did not complete within its per-attempt timeout.
	#[error("Request timed out while calling the service.")]
	Timeout {
		/// Transport-specific failure, when available.
		#[source]
		source: Option<BoxError>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Connection {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The transport could not build the request from the descriptor.
	#[error("Request could not be built: {reason}.")]
	InvalidRequest {
		/// Why the request was rejected.
		reason: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn connection(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connection { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Some(Box::new(src)) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_builder() {
			Self::InvalidRequest { reason: e.to_string() }
		} else {
			Self::connection(e)
		}
	}
}

/// Configuration and validation failures raised while assembling settings or executors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A duration setting must be strictly positive.
	#[error("The {setting} setting must be positive.")]
	NonPositiveDuration {
		/// Name of the offending setting.
		setting: &'static str,
	},
	/// The minimum attempt timeout exceeds the default attempt timeout.
	#[error("The min_http_timeout setting must not exceed http_timeout.")]
	MinTimeoutExceedsDefault,
	/// The sandbox name is empty.
	#[error("Sandbox name cannot be empty.")]
	EmptySandbox,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed: {reason}.")]
	HttpClientBuild {
		/// Underlying builder failure.
		reason: String,
	},
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::HttpClientBuild { reason: e.to_string() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn kinds_follow_variants() {
		assert_eq!(Error::invalid_argument("empty method").kind(), ErrorKind::InvalidArgument);
		assert_eq!(Error::from(AuthError::UserNotSignedIn).kind(), ErrorKind::AuthUserNotSignedIn);
		assert_eq!(
			Error::from(AuthError::token_fetch("xsts")).kind(),
			ErrorKind::AuthTokenFetchFailed
		);
		assert_eq!(
			Error::from(TransportError::Timeout { source: None }).kind(),
			ErrorKind::TransportTimeout
		);
		assert_eq!(
			Error::Throttled { retry_after: None, message: "slow down".into() }.kind(),
			ErrorKind::Throttled
		);
		assert_eq!(Error::Cancelled.kind().as_str(), "cancelled");
	}

	#[test]
	fn auth_error_exposes_source() {
		let io = std::io::Error::other("keychain locked");
		let err = AuthError::token_fetch_with("refresh failed", io);
		let source = StdError::source(&err).expect("Token fetch error should expose its source.");

		assert_eq!(source.to_string(), "keychain locked");
		assert!(err.to_string().contains("refresh failed"));
	}
}
