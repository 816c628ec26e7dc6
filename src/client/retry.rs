//! Per-call retry bookkeeping.

/// Immutable retry state threaded through each attempt of one logical call.
///
/// Every transition returns a new value; the state is never shared between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryState {
	/// Whether this call already went through the 401 refresh path.
	pub auth_retried: bool,
	/// Transient retries issued so far.
	pub transient_retries: u32,
}
impl RetryState {
	/// Marks the refresh path as spent.
	pub const fn after_refresh(self) -> Self {
		Self { auth_retried: true, transient_retries: self.transient_retries }
	}

	/// Counts one more transient retry.
	pub const fn after_transient(self) -> Self {
		Self { auth_retried: self.auth_retried, transient_retries: self.transient_retries + 1 }
	}

	/// Whether another transient retry fits under `max_retries`.
	pub const fn can_retry_transient(self, max_retries: u32) -> bool {
		self.transient_retries < max_retries
	}

	/// Total sends issued once the current attempt has completed.
	pub const fn attempts(self) -> u32 {
		1 + self.transient_retries + self.auth_retried as u32
	}
}
