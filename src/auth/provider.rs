//! Contract for token providers plus a fixed-token implementation.

// self
use crate::{
	_prelude::*,
	auth::AuthToken,
	call::{CallDescriptor, HeaderSet, RequestBody},
	error::AuthError,
};

/// Boxed future returned by [`AuthProvider`] methods.
pub type AuthFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AuthToken, AuthError>> + 'a + Send>>;

/// Request context handed to [`AuthProvider::get_auth_result`] so signatures can cover the
/// method, URL, headers, and body.
#[derive(Clone, Copy, Debug)]
pub struct AuthRequest<'a> {
	/// HTTP method.
	pub method: &'a str,
	/// Absolute request URL.
	pub url: &'a Url,
	/// Headers currently on the descriptor.
	pub headers: &'a HeaderSet,
	/// Request payload.
	pub body: &'a RequestBody,
	/// Whether the token must authorize every signed-in user.
	pub all_users_auth_required: bool,
}
impl<'a> AuthRequest<'a> {
	/// Borrows the request context from a descriptor.
	pub fn from_descriptor(descriptor: &'a CallDescriptor) -> Self {
		Self {
			method: descriptor.method(),
			url: descriptor.url(),
			headers: descriptor.headers(),
			body: descriptor.body(),
			all_users_auth_required: descriptor.all_users_auth_required(),
		}
	}
}

/// Supplies auth tokens for outgoing calls.
///
/// One interface covers every platform; per-platform behavior lives in implementations such as
/// [`StaticAuthProvider`] or [`CachingAuthProvider`](crate::auth::CachingAuthProvider).
pub trait AuthProvider
where
	Self: Send + Sync,
{
	/// Returns the token/signature pair for `request`.
	fn get_auth_result<'a>(&'a self, request: AuthRequest<'a>) -> AuthFuture<'a>;

	/// Forces a token refresh after the service rejected the current token.
	fn refresh_token(&self) -> AuthFuture<'_>;
}

/// Provider handing out one fixed token, or reporting that no user is signed in.
#[derive(Clone, Debug, Default)]
pub struct StaticAuthProvider {
	token: Option<AuthToken>,
}
impl StaticAuthProvider {
	/// Creates a provider that always returns `token`.
	pub fn new(token: AuthToken) -> Self {
		Self { token: Some(token) }
	}

	/// Creates a provider for which no user is signed in.
	pub fn signed_out() -> Self {
		Self { token: None }
	}

	fn current(&self) -> Result<AuthToken, AuthError> {
		self.token.clone().ok_or(AuthError::UserNotSignedIn)
	}
}
impl AuthProvider for StaticAuthProvider {
	fn get_auth_result<'a>(&'a self, _request: AuthRequest<'a>) -> AuthFuture<'a> {
		Box::pin(async move { self.current() })
	}

	fn refresh_token(&self) -> AuthFuture<'_> {
		Box::pin(async move { self.current() })
	}
}
