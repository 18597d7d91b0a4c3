// self
use crate::{_prelude::*, call::XboxLiveApi, config::ThrottleDiagnostics};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span wrapping one call chain.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a span tagged with the api id and HTTP method.
	pub fn new(api: XboxLiveApi, method: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("xbl_http.call", api = api.as_str(), method);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (api, method);

			Self {}
		}
	}

	/// Instruments the call future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Reports a throttled response according to `policy`.
pub fn emit_throttled(policy: ThrottleDiagnostics, api: XboxLiveApi, message: &str) {
	#[cfg(feature = "tracing")]
	{
		match policy {
			ThrottleDiagnostics::Disabled => {},
			ThrottleDiagnostics::Warn => tracing::warn!(
				api = api.as_str(),
				"Xbox Live service call was throttled (HTTP 429): {message}; reduce the call rate."
			),
			ThrottleDiagnostics::Error => tracing::error!(
				api = api.as_str(),
				"Xbox Live service call was throttled (HTTP 429): {message}; reduce the call rate \
				 (reported loudly outside the RETAIL sandbox)."
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (policy, api, message);
	}
}

/// Reports that a 401 triggered the single token-refresh retry.
pub fn emit_auth_retry(api: XboxLiveApi) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(
			api = api.as_str(),
			"Call was rejected with HTTP 401; refreshing the token once."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = api;
	}
}

/// Reports that the token refresh after a 401 failed.
pub fn emit_auth_refresh_failed(api: XboxLiveApi, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(api = api.as_str(), error = %error, "Token refresh after HTTP 401 failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (api, error);
	}
}

/// Reports that a diagnostics sink panicked while receiving a record.
pub fn emit_sink_panicked(api: XboxLiveApi) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(api = api.as_str(), "Diagnostics sink panicked; record dropped.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = api;
	}
}
