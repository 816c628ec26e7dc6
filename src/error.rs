//! Client-level error types surfaced by every API call.

// self
use crate::{_prelude::*, config::ClientConfigError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message used when a failed response carries no `message` field.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Canonical error resolved by every client call.
///
/// Each logical call produces at most one of these; the client never retains them.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session backend failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Token refresh failed, or the backend rejected the refreshed token as well.
	#[error("Session expired; please log in again.")]
	AuthExpired,
	/// Transient failures persisted past the retry bound.
	#[error("Server is unavailable after {attempts} attempts.")]
	ServerUnavailable {
		/// Number of sends issued for the logical call.
		attempts: u32,
	},
	/// Backend answered with a non-retryable, non-2xx status.
	#[error("Request failed with HTTP {status}: {message}")]
	RequestFailed {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Backend-supplied `message`, or [`FALLBACK_MESSAGE`].
		message: String,
	},
	/// No response object was produced (DNS, connect, TLS).
	#[error("No response from the server. Please check your connection.")]
	NetworkUnreachable {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// A successful response carried a body that did not match the expected model.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure, including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
}
impl Error {
	/// Classifies the error into the caller-facing taxonomy.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::AuthExpired => ErrorKind::AuthExpired,
			Self::ServerUnavailable { .. } => ErrorKind::ServerUnavailable,
			Self::RequestFailed { status, .. } => ErrorKind::RequestFailed { status: *status },
			Self::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
			Self::Storage(_) | Self::Config(_) | Self::Decode { .. } => ErrorKind::Local,
		}
	}

	/// HTTP status associated with the failure, when a response was received.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::RequestFailed { status, .. } | Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Human-readable message suitable for UI display.
	pub fn message(&self) -> String {
		match self {
			Self::RequestFailed { message, .. } => message.clone(),
			other => other.to_string(),
		}
	}
}

/// Caller-facing error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Refresh failed or the second 401 arrived.
	AuthExpired,
	/// Transient retries exhausted.
	ServerUnavailable,
	/// Any other non-2xx status.
	RequestFailed {
		/// HTTP status code.
		status: u16,
	},
	/// No response was received.
	NetworkUnreachable,
	/// Failure raised locally (config, storage, decoding).
	Local,
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] ClientConfigError),
	/// Request path is not relative to the configured base URL.
	#[error("Request path `{path}` must be relative to the base URL and start with `/`.")]
	InvalidPath {
		/// Offending path.
		path: String,
	},
	/// Joined endpoint URL could not be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The send exceeded its upper bound or was aborted mid-flight.
	#[error("Request timed out before the server responded.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` when the failure is eligible for a transient retry.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Timeout)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
