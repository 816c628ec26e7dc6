//! Client configuration: backend location, login entry point, and retry bounds.
//!
//! Values are assembled through [`ClientConfigBuilder`] or read from the environment via
//! [`ClientConfig::from_env`], and validated once so the pipeline can join request paths
//! without re-checking them.

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Base URL used when no environment override is present.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Environment variable consulted by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "CONVO_API_URL";
/// Upper bound for a single send.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// Transient retries allowed per logical call.
pub const MAX_RETRIES: u32 = 2;
/// Login entry point the UI is sent to when a session expires.
pub const DEFAULT_LOGIN_PATH: &str = "/login";
/// Endpoint that exchanges a refresh token for a new access token.
pub const DEFAULT_REFRESH_PATH: &str = "/refresh-token";

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL every request path is appended to.
	pub base_url: Url,
	/// Login entry point handed to the redirect collaborator.
	pub login_path: String,
	/// Refresh endpoint path relative to the base URL.
	pub refresh_path: String,
	/// Upper bound for each individual send.
	pub timeout: StdDuration,
	/// Transient retries allowed per logical call.
	pub max_retries: u32,
}
impl ClientConfig {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Builds a default configuration from [`BASE_URL_ENV`], falling back to
	/// [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ClientConfigError> {
		let raw = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

		Self::parse(&raw)
	}

	/// Builds a default configuration from a base URL string.
	pub fn parse(base_url: &str) -> Result<Self, ClientConfigError> {
		let base_url = Url::parse(base_url.trim())
			.map_err(|source| ClientConfigError::InvalidBaseUrl { source })?;

		Self::builder(base_url).build()
	}

	/// Joins a relative request path onto the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		if !is_relative_path(path) {
			return Err(ConfigError::InvalidPath { path: path.to_owned() });
		}

		let base = self.base_url.as_str().trim_end_matches('/');

		Url::parse(&format!("{base}{path}")).map_err(|source| ConfigError::InvalidUrl { source })
	}
}

/// Returns `true` when `path` is a rooted path rather than an absolute or protocol-relative URL.
pub(crate) fn is_relative_path(path: &str) -> bool {
	path.starts_with('/') && !path.starts_with("//") && !path.contains("://")
}
