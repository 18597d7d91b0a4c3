//! Caching provider over per-platform token sources.
//!
//! Platforms differ in how they obtain tokens (system sign-in, device flows, test fixtures) but
//! share the same caching rules. [`CachingAuthProvider`] wraps any [`TokenSource`], reuses the
//! cached token until a call is rejected, and funnels concurrent refreshes through one
//! singleflight guard so a burst of 401s triggers a single forced fetch.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{AuthFuture, AuthProvider, AuthRequest, AuthToken},
	error::AuthError,
};

/// Platform-specific token acquisition.
pub trait TokenSource
where
	Self: 'static + Send + Sync,
{
	/// Returns `true` when a user is signed in.
	fn is_signed_in(&self) -> bool;

	/// Fetches a token, bypassing any platform cache when `force_refresh` is set.
	fn fetch_token(&self, force_refresh: bool) -> AuthFuture<'_>;
}

/// [`AuthProvider`] that caches tokens from a [`TokenSource`] and singleflights refreshes.
#[derive(Debug)]
pub struct CachingAuthProvider<S> {
	source: S,
	cached: Mutex<Option<AuthToken>>,
	refresh_guard: AsyncMutex<()>,
	generation: AtomicU64,
	fetches: AtomicU64,
}
impl<S> CachingAuthProvider<S>
where
	S: TokenSource,
{
	/// Wraps `source` with an empty cache.
	pub fn new(source: S) -> Self {
		Self {
			source,
			cached: Mutex::new(None),
			refresh_guard: AsyncMutex::new(()),
			generation: AtomicU64::new(0),
			fetches: AtomicU64::new(0),
		}
	}

	/// Returns the wrapped token source.
	pub fn source(&self) -> &S {
		&self.source
	}

	/// Returns how many times the source was asked for a token.
	pub fn fetch_count(&self) -> u64 {
		self.fetches.load(Ordering::Relaxed)
	}

	/// Drops the cached token so the next call fetches a new one.
	pub fn invalidate(&self) {
		self.cached.lock().take();
	}

	async fn cached_or_fetch(&self) -> Result<AuthToken, AuthError> {
		self.ensure_signed_in()?;

		if let Some(token) = self.cached.lock().clone() {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have filled the cache while this one waited.
		if let Some(token) = self.cached.lock().clone() {
			return Ok(token);
		}

		self.fetch_and_store(false).await
	}

	async fn forced_refresh(&self) -> Result<AuthToken, AuthError> {
		self.ensure_signed_in()?;

		let seen = self.generation.load(Ordering::Acquire);
		let _singleflight = self.refresh_guard.lock().await;

		// A refresh finished while this caller waited; reuse its token.
		if self.generation.load(Ordering::Acquire) != seen {
			if let Some(token) = self.cached.lock().clone() {
				return Ok(token);
			}
		}

		self.fetch_and_store(true).await
	}

	async fn fetch_and_store(&self, force_refresh: bool) -> Result<AuthToken, AuthError> {
		self.fetches.fetch_add(1, Ordering::Relaxed);

		let token = self.source.fetch_token(force_refresh).await.inspect_err(|_| {
			self.cached.lock().take();
		})?;

		*self.cached.lock() = Some(token.clone());
		self.generation.fetch_add(1, Ordering::Release);

		Ok(token)
	}

	fn ensure_signed_in(&self) -> Result<(), AuthError> {
		if self.source.is_signed_in() {
			Ok(())
		} else {
			self.cached.lock().take();

			Err(AuthError::UserNotSignedIn)
		}
	}
}
impl<S> AuthProvider for CachingAuthProvider<S>
where
	S: TokenSource,
{
	fn get_auth_result<'a>(&'a self, _request: AuthRequest<'a>) -> AuthFuture<'a> {
		Box::pin(self.cached_or_fetch())
	}

	fn refresh_token(&self) -> AuthFuture<'_> {
		Box::pin(self.forced_refresh())
	}
}
