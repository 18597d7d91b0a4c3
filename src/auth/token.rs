//! Token and signature pair with redacting formatters.

// self
use crate::_prelude::*;

/// Token/signature pair issued by an [`AuthProvider`](crate::auth::AuthProvider).
///
/// An empty value means "do not attach this header". Formatters never print either value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
	token: String,
	signature: String,
}
impl AuthToken {
	/// Creates a new token/signature pair.
	pub fn new(token: impl Into<String>, signature: impl Into<String>) -> Self {
		Self { token: token.into(), signature: signature.into() }
	}

	/// Returns the `Authorization` value. Callers must avoid logging this string.
	pub fn token(&self) -> &str {
		&self.token
	}

	/// Returns the `Signature` value. Callers must avoid logging this string.
	pub fn signature(&self) -> &str {
		&self.signature
	}

	/// Returns `true` when neither value would be attached.
	pub fn is_empty(&self) -> bool {
		self.token.is_empty() && self.signature.is_empty()
	}
}
impl Debug for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthToken")
			.field("token", &redacted(&self.token))
			.field("signature", &redacted(&self.signature))
			.finish()
	}
}
impl Display for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

fn redacted(value: &str) -> &'static str {
	if value.is_empty() { "<empty>" } else { "<redacted>" }
}
