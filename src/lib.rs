//! Convo's authenticated API client: bearer injection, single-shot token refresh with
//! coalesced rotations, and bounded transient retries over a pluggable HTTP transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod navigation;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		http::ReqwestHttpClient,
		navigation::{LoginRedirect, RecordingRedirect},
		store::{MemoryStore, SessionStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestHttpClient>;

	/// Handles returned alongside a test client so assertions can inspect side effects.
	pub struct TestHarness {
		/// Client under test.
		pub client: ReqwestTestClient,
		/// Session backend shared with the client.
		pub store: Arc<MemoryStore>,
		/// Redirect collaborator that records every login navigation.
		pub redirect: Arc<RecordingRedirect>,
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Parses a test base URL (typically `MockServer::base_url()`).
	pub fn test_config(base_url: &str) -> ClientConfig {
		let base_url = Url::parse(base_url).expect("Failed to parse test base URL.");

		ClientConfig::builder(base_url).build().expect("Failed to build test client config.")
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store, a recording redirect, and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(config: ClientConfig) -> TestHarness {
		let store = Arc::new(MemoryStore::default());
		let redirect = Arc::new(RecordingRedirect::default());
		let session_store: Arc<dyn SessionStore> = store.clone();
		let login_redirect: Arc<dyn LoginRedirect> = redirect.clone();
		let client = ApiClient::with_http_client(
			config,
			session_store,
			test_reqwest_http_client(),
			login_redirect,
		);

		TestHarness { client, store, redirect }
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{OffsetDateTime, PrimitiveDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
