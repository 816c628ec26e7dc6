//! Login credentials; transient and never persisted.

// self
use crate::_prelude::*;

/// Email/password pair posted to `/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
	/// Account email.
	pub email: String,
	/// Plaintext password; redacted from `Debug`.
	pub password: String,
}
impl Credentials {
	/// Creates a credential pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}
