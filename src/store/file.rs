//! File-backed [`SessionStore`] that survives process restarts.
//!
//! The session is written as a small JSON document keyed by fixed names (`token`,
//! `refresh_token`, `issued_at`). Clearing the session removes the file.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind as IoErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
	store::{self, CompareAndSwapOutcome, SessionStore, StoreError, StoreFuture},
};

/// On-disk layout of the persisted session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
	token: TokenSecret,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<TokenSecret>,
	#[serde(with = "time::serde::rfc3339")]
	issued_at: OffsetDateTime,
}
impl From<&Session> for StoredSession {
	fn from(session: &Session) -> Self {
		Self {
			token: session.access_token.clone(),
			refresh_token: session.refresh_token.clone(),
			issued_at: session.issued_at,
		}
	}
}
impl From<StoredSession> for Session {
	fn from(stored: StoredSession) -> Self {
		Self {
			access_token: stored.token,
			refresh_token: stored.refresh_token,
			issued_at: stored.issued_at,
		}
	}
}

/// Persists the session to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<Session>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Option<Session>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let stored: StoredSession =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(Some(stored.into()))
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: Option<&Session>) -> Result<(), StoreError> {
		let Some(session) = contents else {
			return match fs::remove_file(&self.path) {
				Ok(()) => Ok(()),
				Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
				Err(e) => Err(StoreError::Backend {
					message: format!("Failed to remove {}: {e}", self.path.display()),
				}),
			};
		};

		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(&StoredSession::from(session)).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to serialize session: {e}") }
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl SessionStore for FileStore {
	fn get(&self) -> StoreFuture<'_, Option<Session>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn set(&self, session: Session) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(Some(&session))?;
			*guard = Some(session);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(None)?;
			*guard = None;

			Ok(())
		})
	}

	fn compare_and_swap_access<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Session,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let outcome = store::cas_outcome(guard.as_ref(), expected_refresh);

			if matches!(outcome, CompareAndSwapOutcome::Updated) {
				self.persist_locked(Some(&replacement))?;
				*guard = Some(replacement);
			}

			Ok(outcome)
		})
	}

	fn revoke<'a>(&'a self, expected_access: &'a str) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if !guard.as_ref().is_some_and(|session| session.holds_access(expected_access)) {
				return Ok(None);
			}

			self.persist_locked(None)?;

			Ok(guard.take())
		})
	}
}
