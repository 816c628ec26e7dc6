//! Session storage contract and built-in backends.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Session};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding the single current [`Session`].
///
/// The client reads the session before every send. Refresh rotations and teardowns go
/// through the conditional operations so a stale call can never overwrite or delete a
/// session created by a newer login.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the current session, if any.
	fn get(&self) -> StoreFuture<'_, Option<Session>>;

	/// Persists or replaces the current session.
	fn set(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Deletes the current session unconditionally.
	fn clear(&self) -> StoreFuture<'_, ()>;

	/// Replaces the session only if its refresh token still equals `expected_refresh`.
	fn compare_and_swap_access<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Session,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;

	/// Deletes the session only if its access token still equals `expected_access`,
	/// returning the removed session.
	fn revoke<'a>(&'a self, expected_access: &'a str) -> StoreFuture<'a, Option<Session>>;
}

/// Result of a refresh compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The refresh token matched and the session was replaced.
	Updated,
	/// A session exists but it was created by a different login.
	RefreshMismatch,
	/// No session is stored (logged out meanwhile).
	Missing,
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Shared compare-and-swap decision used by the built-in backends.
pub(crate) fn cas_outcome(
	current: Option<&Session>,
	expected_refresh: &str,
) -> CompareAndSwapOutcome {
	match current {
		Some(existing) if existing.holds_refresh(expected_refresh) =>
			CompareAndSwapOutcome::Updated,
		Some(_) => CompareAndSwapOutcome::RefreshMismatch,
		None => CompareAndSwapOutcome::Missing,
	}
}
