// self
use crate::{
	_prelude::*,
	config::{
		ClientConfig, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT, MAX_RETRIES,
		is_relative_path,
	},
};

/// Errors raised while constructing or validating client configurations.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Base URL could not be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL must be an HTTP(S) base without a query or fragment.
	#[error("Base URL must be a plain http(s) URL without a query or fragment: {url}.")]
	UnsupportedBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Configured paths must be relative to the base URL.
	#[error("The {field} path must start with `/`: {path}.")]
	InvalidPath {
		/// Which path failed validation.
		field: &'static str,
		/// Offending value.
		path: String,
	},
	/// A zero timeout would fail every send.
	#[error("Send timeout must be greater than zero.")]
	ZeroTimeout,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
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
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the documented defaults.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			login_path: DEFAULT_LOGIN_PATH.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			timeout: DEFAULT_TIMEOUT,
			max_retries: MAX_RETRIES,
		}
	}

	/// Overrides the login entry point.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the per-send timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the transient retry bound.
	pub fn max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			login_path: self.login_path,
			refresh_path: self.refresh_path,
			timeout: self.timeout,
			max_retries: self.max_retries,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https")
			|| self.base_url.cannot_be_a_base()
			|| self.base_url.query().is_some()
			|| self.base_url.fragment().is_some()
		{
			return Err(ClientConfigError::UnsupportedBaseUrl { url: self.base_url.to_string() });
		}
		if self.timeout.is_zero() {
			return Err(ClientConfigError::ZeroTimeout);
		}

		validate_path("login", &self.login_path)?;
		validate_path("refresh", &self.refresh_path)?;

		Ok(())
	}
}

fn validate_path(field: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if is_relative_path(path) {
		Ok(())
	} else {
		Err(ClientConfigError::InvalidPath { field, path: path.to_owned() })
	}
}
