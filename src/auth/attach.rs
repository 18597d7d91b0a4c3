//! Attaches provider tokens to descriptors.

// self
use crate::{
	_prelude::*,
	auth::{AuthProvider, AuthRequest, AuthToken},
	call::{AUTHORIZATION_HEADER, CallDescriptor, SIGNATURE_HEADER},
	error::AuthError,
};

/// Obtains a token from an [`AuthProvider`] and writes it onto a descriptor.
///
/// Attaching takes `&mut CallDescriptor`, so one descriptor can never be authorized by two
/// concurrent attaches.
#[derive(Clone, Copy)]
pub struct AuthAttacher<'a> {
	provider: &'a dyn AuthProvider,
}
impl<'a> AuthAttacher<'a> {
	/// Creates an attacher over `provider`.
	pub fn new(provider: &'a dyn AuthProvider) -> Self {
		Self { provider }
	}

	/// Requests a token for `descriptor` and attaches it.
	///
	/// Provider failures are returned unchanged and leave the descriptor untouched.
	pub async fn attach(&self, descriptor: &mut CallDescriptor) -> Result<(), AuthError> {
		let request = AuthRequest::from_descriptor(descriptor);
		let token = self.provider.get_auth_result(request).await?;

		Self::apply(descriptor, &token);

		Ok(())
	}

	/// Forces a refresh and attaches the refreshed token.
	pub async fn refresh(&self, descriptor: &mut CallDescriptor) -> Result<(), AuthError> {
		let token = self.provider.refresh_token().await?;

		Self::apply(descriptor, &token);

		Ok(())
	}

	/// Writes `token` onto `descriptor`.
	///
	/// Non-empty values replace any stale header; empty values remove it.
	pub fn apply(descriptor: &mut CallDescriptor, token: &AuthToken) {
		let headers = descriptor.headers_mut();
		let pairs = [(AUTHORIZATION_HEADER, token.token()), (SIGNATURE_HEADER, token.signature())];

		for (name, value) in pairs {
			if value.is_empty() {
				headers.remove(name);
			} else {
				headers.insert(name, value);
			}
		}
	}
}
impl Debug for AuthAttacher<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AuthAttacher(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::ScriptedAuthProvider, call::XboxLiveApi, config::CallSettings};

	fn descriptor() -> CallDescriptor {
		CallDescriptor::new(
			&CallSettings::default(),
			"POST",
			"https://sessiondirectory.xboxlive.com/serviceconfigs/1/sessions",
			XboxLiveApi::WriteSessionUsingSubpath,
		)
		.expect("Descriptor should build.")
	}

	#[tokio::test]
	async fn attach_sets_only_non_empty_headers() {
		let provider =
			ScriptedAuthProvider::default().token(Ok(AuthToken::new("XBL3.0 x=1;a", "")));
		let mut descriptor = descriptor();

		AuthAttacher::new(&provider).attach(&mut descriptor).await.expect("Attach should succeed.");

		assert_eq!(descriptor.headers().get("authorization"), Some("XBL3.0 x=1;a"));
		assert!(!descriptor.headers().contains(SIGNATURE_HEADER));
	}

	#[tokio::test]
	async fn refresh_replaces_stale_headers() {
		let provider = ScriptedAuthProvider::default()
			.token(Ok(AuthToken::new("XBL3.0 x=1;old", "old-sig")))
			.refresh(Ok(AuthToken::new("XBL3.0 x=1;new", "")));
		let attacher = AuthAttacher::new(&provider);
		let mut descriptor = descriptor();

		attacher.attach(&mut descriptor).await.expect("Attach should succeed.");
		attacher.refresh(&mut descriptor).await.expect("Refresh should succeed.");

		assert_eq!(descriptor.headers().get(AUTHORIZATION_HEADER), Some("XBL3.0 x=1;new"));
		assert!(!descriptor.headers().contains("signature"));
		assert_eq!(provider.refresh_calls(), 1);
	}

	#[tokio::test]
	async fn failures_leave_descriptor_untouched() {
		let provider = ScriptedAuthProvider::default().token(Err(AuthError::UserNotSignedIn));
		let mut descriptor = descriptor();
		let before = descriptor.headers().clone();
		let err = AuthAttacher::new(&provider)
			.attach(&mut descriptor)
			.await
			.expect_err("Signed-out provider must fail.");

		assert!(matches!(err, AuthError::UserNotSignedIn));
		assert_eq!(descriptor.headers(), &before);
	}
}
