//! Session record holding the current access token and its refresh companion.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access/refresh token pair owned by the client through a
/// [`SessionStore`](crate::store::SessionStore).
///
/// At most one access token is current at a time; [`Session::rotated`] produces the
/// replacement after a refresh so stale values are never reused.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Short-lived bearer credential attached to every authorized request.
	pub access_token: TokenSecret,
	/// Longer-lived credential exchanged for a new access token, if the backend issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the current access token was stored.
	pub issued_at: OffsetDateTime,
}
impl Session {
	/// Creates a session stamped with the current clock and no refresh token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Overrides the issued-at instant.
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Builds the successor session after a refresh, keeping the current refresh token when
	/// the backend did not rotate it.
	pub fn rotated(&self, access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token
				.map(TokenSecret::new)
				.or_else(|| self.refresh_token.clone()),
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Returns `true` if `token` is this session's access token.
	pub fn holds_access(&self, token: &str) -> bool {
		self.access_token.expose() == token
	}

	/// Returns `true` if `token` is this session's refresh token.
	pub fn holds_refresh(&self, token: &str) -> bool {
		self.refresh_token.as_ref().is_some_and(|current| current.expose() == token)
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
