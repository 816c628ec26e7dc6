//! Thread-safe in-memory [`SessionStore`] implementation for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::Session,
	store::{self, CompareAndSwapOutcome, SessionStore, StoreFuture},
};

type SessionSlot = Arc<RwLock<Option<Session>>>;

/// Session backend that keeps the current session in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SessionSlot);
impl MemoryStore {
	/// Creates a store pre-seeded with `session`.
	pub fn with_session(session: Session) -> Self {
		Self(Arc::new(RwLock::new(Some(session))))
	}

	/// Returns a snapshot of the stored session without going through the async contract.
	pub fn snapshot(&self) -> Option<Session> {
		self.0.read().clone()
	}

	fn cas_now(
		slot: SessionSlot,
		expected_refresh: &str,
		replacement: Session,
	) -> CompareAndSwapOutcome {
		let mut guard = slot.write();
		let outcome = store::cas_outcome(guard.as_ref(), expected_refresh);

		if matches!(outcome, CompareAndSwapOutcome::Updated) {
			*guard = Some(replacement);
		}

		outcome
	}

	fn revoke_now(slot: SessionSlot, expected_access: &str) -> Option<Session> {
		let mut guard = slot.write();

		if guard.as_ref().is_some_and(|session| session.holds_access(expected_access)) {
			guard.take()
		} else {
			None
		}
	}
}
impl SessionStore for MemoryStore {
	fn get(&self) -> StoreFuture<'_, Option<Session>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn set(&self, session: Session) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(session);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}

	fn compare_and_swap_access<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Session,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::cas_now(slot, expected_refresh, replacement)) })
	}

	fn revoke<'a>(&'a self, expected_access: &'a str) -> StoreFuture<'a, Option<Session>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::revoke_now(slot, expected_access)) })
	}
}
