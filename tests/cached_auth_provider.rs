// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};
// crates.io
use xbl_http_pipeline::{
	auth::{AuthFuture, AuthProvider, AuthRequest, AuthToken, CachingAuthProvider, TokenSource},
	call::{CallDescriptor, XboxLiveApi},
	config::CallSettings,
	error::AuthError,
};

#[derive(Default)]
struct SlowSource {
	signed_out: AtomicBool,
	forced: AtomicUsize,
	fail_next: AtomicBool,
}
impl TokenSource for SlowSource {
	fn is_signed_in(&self) -> bool {
		!self.signed_out.load(Ordering::SeqCst)
	}

	fn fetch_token(&self, force_refresh: bool) -> AuthFuture<'_> {
		Box::pin(async move {
			tokio::time::sleep(std::time::Duration::from_millis(10)).await;

			if self.fail_next.swap(false, Ordering::SeqCst) {
				return Err(AuthError::token_fetch("token service unavailable"));
			}
			if force_refresh {
				let n = self.forced.fetch_add(1, Ordering::SeqCst) + 1;

				return Ok(AuthToken::new(format!("XBL3.0 x=7;refresh-{n}"), "sig"));
			}

			Ok(AuthToken::new("XBL3.0 x=7;initial", "sig"))
		})
	}
}

fn descriptor() -> CallDescriptor {
	CallDescriptor::new(
		&CallSettings::default(),
		"GET",
		"https://privacy.xboxlive.com/users/xuid(7)/people/mute",
		XboxLiveApi::GetAvoidOrMuteList,
	)
	.expect("Descriptor should build.")
}

#[tokio::test]
async fn concurrent_first_requests_fetch_once() {
	let provider = CachingAuthProvider::new(SlowSource::default());
	let descriptor = descriptor();
	let (first, second) = tokio::join!(
		provider.get_auth_result(AuthRequest::from_descriptor(&descriptor)),
		provider.get_auth_result(AuthRequest::from_descriptor(&descriptor)),
	);

	assert_eq!(first.expect("First fetch should succeed.").token(), "XBL3.0 x=7;initial");
	assert_eq!(second.expect("Second fetch should succeed.").token(), "XBL3.0 x=7;initial");
	assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_are_singleflighted() {
	let provider = CachingAuthProvider::new(SlowSource::default());
	let descriptor = descriptor();

	provider
		.get_auth_result(AuthRequest::from_descriptor(&descriptor))
		.await
		.expect("Initial fetch should succeed.");

	let (first, second) = tokio::join!(provider.refresh_token(), provider.refresh_token());

	assert_eq!(first.expect("First refresh should succeed.").token(), "XBL3.0 x=7;refresh-1");
	assert_eq!(second.expect("Second refresh should succeed.").token(), "XBL3.0 x=7;refresh-1");
	assert_eq!(provider.source().forced.load(Ordering::SeqCst), 1);
	assert_eq!(provider.fetch_count(), 2);
}

#[tokio::test]
async fn failed_refresh_drops_the_cached_token() {
	let provider = Arc::new(CachingAuthProvider::new(SlowSource::default()));
	let descriptor = descriptor();

	provider
		.get_auth_result(AuthRequest::from_descriptor(&descriptor))
		.await
		.expect("Initial fetch should succeed.");
	provider.source().fail_next.store(true, Ordering::SeqCst);

	let err = provider.refresh_token().await.expect_err("Scripted refresh failure must surface.");

	assert!(matches!(err, AuthError::TokenFetchFailed { .. }));

	let token = provider
		.get_auth_result(AuthRequest::from_descriptor(&descriptor))
		.await
		.expect("Fetch after failure should succeed.");

	assert_eq!(token.token(), "XBL3.0 x=7;initial");
	assert_eq!(provider.fetch_count(), 3);
}

#[tokio::test]
async fn signing_out_blocks_further_tokens() {
	let provider = CachingAuthProvider::new(SlowSource::default());
	let descriptor = descriptor();

	provider
		.get_auth_result(AuthRequest::from_descriptor(&descriptor))
		.await
		.expect("Initial fetch should succeed.");
	provider.source().signed_out.store(true, Ordering::SeqCst);

	let err = provider
		.get_auth_result(AuthRequest::from_descriptor(&descriptor))
		.await
		.expect_err("Signed-out source must fail.");

	assert!(matches!(err, AuthError::UserNotSignedIn));

	provider.source().signed_out.store(false, Ordering::SeqCst);
	provider.invalidate();
	provider
		.get_auth_result(AuthRequest::from_descriptor(&descriptor))
		.await
		.expect("Signing back in should allow fetching again.");

	assert_eq!(provider.fetch_count(), 2);
}
