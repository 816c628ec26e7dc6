//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `convo_client.call` with the `kind` and
//!   `stage` fields, plus events for retries and session teardowns.
//! - Enable `metrics` to increment the `convo_client_call_total` counter for every
//!   attempt/success/failure (labeled by `kind` + `outcome`) and `convo_client_retry_total`
//!   for every transient retry (labeled by `reason`), and `convo_client_teardown_total` for
//!   every expired session (labeled by `reason`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// A logical API call through the request pipeline.
	Request,
	/// A token refresh exchange.
	Refresh,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why a session was torn down and the UI sent back to the login entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeardownReason {
	/// The replayed request was rejected again with the refreshed token.
	RejectedAfterRefresh,
	/// A 401 arrived but the store no longer held a session.
	SessionMissing,
	/// The session carried no refresh token to exchange.
	RefreshTokenMissing,
	/// The refresh endpoint failed, was unreachable, or answered with an unreadable body.
	RefreshRejected,
	/// The session was cleared while the refresh was in flight.
	LoggedOutDuringRefresh,
}
impl TeardownReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TeardownReason::RejectedAfterRefresh => "rejected_after_refresh",
			TeardownReason::SessionMissing => "session_missing",
			TeardownReason::RefreshTokenMissing => "refresh_token_missing",
			TeardownReason::RefreshRejected => "refresh_rejected",
			TeardownReason::LoggedOutDuringRefresh => "logged_out_during_refresh",
		}
	}
}
impl Display for TeardownReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
