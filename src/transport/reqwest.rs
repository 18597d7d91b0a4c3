//! [`Transport`] backed by reqwest.

// std
use std::ops::Deref;
// crates.io
use reqwest::{Method, redirect::Policy};
// self
use crate::{
	_prelude::*,
	call::{HeaderSet, RequestBody},
	error::{ConfigError, TransportError},
	transport::{RawResponse, Transport, TransportFuture, TransportRequest},
};

/// Thin wrapper around [`ReqwestClient`] performing one attempt per call.
///
/// The per-attempt timeout from [`TransportRequest::timeout`] is applied on every request, so
/// a client-wide timeout is unnecessary. Retry hints are ignored; the executor owns retries.
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
impl ReqwestTransport {
	/// Builds a transport over a fresh client that does not follow redirects.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl Transport for ReqwestTransport {
	fn perform(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = Method::from_bytes(request.method.as_bytes())
				.map_err(|e| TransportError::InvalidRequest { reason: e.to_string() })?;
			let timeout = std::time::Duration::try_from(request.timeout).map_err(|e| {
				TransportError::InvalidRequest { reason: format!("attempt timeout ({e})") }
			})?;
			let mut builder = client.request(method, request.url).timeout(timeout);

			for (name, value) in request.headers.iter() {
				builder = builder.header(name, value);
			}

			builder = match request.body {
				RequestBody::None => builder,
				RequestBody::Text(text) => builder.body(text),
				RequestBody::Bytes(bytes) => builder.body(bytes),
			};

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let mut headers = HeaderSet::new();

			for (name, value) in response.headers() {
				if let Ok(value) = value.to_str() {
					headers.append(name.as_str(), value);
				}
			}

			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, headers, body })
		})
	}
}
