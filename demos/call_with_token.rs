//! Demonstrates executing authenticated calls with the default reqwest transport.
//!
//! The demo stands up a local mock service that rejects a stale token with HTTP 401 and throttles
//! a second endpoint with HTTP 429, then shows the single auth retry and the throttle registry.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use xbl_http_pipeline::{
	auth::{AuthFuture, AuthToken, CachingAuthProvider, TokenSource},
	call::XboxLiveApi,
	config::CallSettings,
	executor::CallExecutor,
	throttle::ThrottleRegistry,
	transport::ReqwestTransport,
};

/// Token source standing in for a platform sign-in integration.
struct DemoSource;
impl TokenSource for DemoSource {
	fn is_signed_in(&self) -> bool {
		true
	}

	fn fetch_token(&self, force_refresh: bool) -> AuthFuture<'_> {
		let token = if force_refresh { "XBL3.0 x=2533;fresh" } else { "XBL3.0 x=2533;stale" };

		Box::pin(async move { Ok(AuthToken::new(token, "demo-signature")) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/quota").header("authorization", "XBL3.0 x=2533;stale");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/quota").header("authorization", "XBL3.0 x=2533;fresh");
			then.status(200).body("{\"quotaInfo\":{\"usedBytes\":512,\"quotaBytes\":65536}}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/leaderboard");
			then.status(429).header("Retry-After", "30").body(
				"{\"limitType\":\"Rate\",\"currentRequests\":31,\"maxRequests\":30,\"periodInSeconds\":15}",
			);
		})
		.await;

	let settings = CallSettings::builder().sandbox("XDKS.1").user_agent_suffix("demo/1").build()?;
	let registry = Arc::new(ThrottleRegistry::default());
	let executor = CallExecutor::new(settings, Arc::new(ReqwestTransport::new()?))?
		.with_throttle_registry(registry.clone())
		.with_auth_provider(Arc::new(CachingAuthProvider::new(DemoSource)));
	let quota = executor.execute(executor.descriptor(
		"GET",
		&server.url("/quota"),
		XboxLiveApi::GetQuota,
	)?)
	.await;

	println!(
		"quota: status={} attempts={} body={}",
		quota.http_status,
		quota.attempts,
		quota.body_text()
	);

	let leaderboard = executor
		.execute(executor.descriptor(
			"GET",
			&server.url("/leaderboard"),
			XboxLiveApi::GetLeaderboard,
		)?)
		.await;

	println!(
		"leaderboard: status={} error={:?}",
		leaderboard.http_status,
		leaderboard.error.as_ref().map(ToString::to_string)
	);
	println!("throttle state: {:?}", registry.get_state(XboxLiveApi::GetLeaderboard));

	Ok(())
}
