//! Login redirect hook invoked when a call ends in
//! [`Error::AuthExpired`](crate::error::Error::AuthExpired).
//!
//! The client never navigates on its own; the UI layer plugs in an implementation that
//! moves the user to the login entry point.

// self
use crate::_prelude::*;

/// UI collaborator told to send the user back to the login entry point.
pub trait LoginRedirect
where
	Self: Send + Sync,
{
	/// Navigates to `entry_point` (the configured login path).
	fn redirect_to_login(&self, entry_point: &str);
}

/// Redirect that does nothing; useful for headless callers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRedirect;
impl LoginRedirect for NoopRedirect {
	fn redirect_to_login(&self, _entry_point: &str) {}
}

/// Redirect that records every navigation request.
#[derive(Debug, Default)]
pub struct RecordingRedirect(Mutex<Vec<String>>);
impl RecordingRedirect {
	/// Entry points requested so far, oldest first.
	pub fn redirects(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	/// Number of navigation requests observed.
	pub fn count(&self) -> usize {
		self.0.lock().len()
	}
}
impl LoginRedirect for RecordingRedirect {
	fn redirect_to_login(&self, entry_point: &str) {
		self.0.lock().push(entry_point.to_owned());
	}
}
