//! Named request-pipeline stages: prepare, inject-auth, classify, decide.
//!
//! Sending happens in [`ApiClient`](crate::client::ApiClient); everything here is pure so each
//! stage can be tested in isolation.

// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
	client::RetryState,
	config::ClientConfig,
	error::TransportError,
	http::{AUTHORIZATION, ApiRequest, ApiResponse, AuthMode, HttpRequest},
};

/// Gateway statuses treated as transient.
pub const TRANSIENT_STATUSES: [u16; 3] = [502, 503, 504];

/// Request with its bearer header resolved for one attempt.
#[derive(Clone, Debug)]
pub struct Authorized {
	/// Request ready for the transport.
	pub request: HttpRequest,
	/// Access token attached to this attempt, if any.
	pub sent_token: Option<TokenSecret>,
}

/// Why a failure qualified for a transient retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransientCause {
	/// The send exceeded its timeout.
	Timeout,
	/// The backend answered with a gateway status.
	Status(u16),
}
impl TransientCause {
	/// Stable label for metrics and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Timeout => "timeout",
			Self::Status(502) => "status_502",
			Self::Status(503) => "status_503",
			Self::Status(504) => "status_504",
			Self::Status(_) => "status_other",
		}
	}
}

/// Outcome of a single send, before retry policy is applied.
#[derive(Debug)]
pub enum Classified {
	/// 2xx response.
	Success(ApiResponse),
	/// 401 response.
	Unauthorized {
		/// Backend message (or fallback) for public requests that surface the 401.
		message: String,
	},
	/// Timeout or 502/503/504.
	Transient(TransientCause),
	/// Any other non-2xx response.
	Failed {
		/// HTTP status code.
		status: u16,
		/// Backend message or fallback.
		message: String,
	},
	/// No response object.
	Unreachable(TransportError),
}

/// Next action for the call loop.
#[derive(Debug)]
pub enum Step {
	/// Terminal success.
	Return(ApiResponse),
	/// Refresh the session, then re-send with the given state.
	Refresh(RetryState),
	/// Re-send with the given state.
	Retry(RetryState, TransientCause),
	/// Second 401: tear the session down and end with `AuthExpired`.
	Expire,
	/// Terminal failure.
	Fail(Error),
}

/// Resolves the descriptor against the configuration (absolute URL, timeout).
pub fn prepare(config: &ClientConfig, request: &ApiRequest) -> Result<HttpRequest> {
	Ok(HttpRequest {
		method: request.method,
		url: config.endpoint(&request.path)?,
		headers: request.headers.clone(),
		body: request.body.clone(),
		timeout: config.timeout,
	})
}

/// Attaches `Authorization: Bearer <token>` when the request is bearer-authenticated and a
/// session is present.
pub fn inject_auth(
	mut request: HttpRequest,
	auth: AuthMode,
	session: Option<&Session>,
) -> Authorized {
	let sent_token = match (auth, session) {
		(AuthMode::Bearer, Some(session)) => Some(session.access_token.clone()),
		_ => None,
	};

	request.headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION));

	if let Some(token) = &sent_token {
		request.headers.insert(AUTHORIZATION.into(), token.bearer());
	}

	Authorized { request, sent_token }
}

/// Classifies a transport outcome.
pub fn classify(outcome: Result<ApiResponse, TransportError>) -> Classified {
	match outcome {
		Ok(response) if response.is_success() => Classified::Success(response),
		Ok(response) if response.status == 401 =>
			Classified::Unauthorized { message: response.error_message_or_fallback() },
		Ok(response) if TRANSIENT_STATUSES.contains(&response.status) =>
			Classified::Transient(TransientCause::Status(response.status)),
		Ok(response) => Classified::Failed {
			status: response.status,
			message: response.error_message_or_fallback(),
		},
		Err(TransportError::Timeout) => Classified::Transient(TransientCause::Timeout),
		Err(source) => Classified::Unreachable(source),
	}
}

/// Applies the retry policy to a classified outcome.
///
/// The 401 path and the transient path never feed each other: a 401 does not consume the
/// transient budget and a gateway status never triggers a refresh.
pub fn decide(classified: Classified, state: RetryState, max_retries: u32, auth: AuthMode) -> Step {
	match classified {
		Classified::Success(response) => Step::Return(response),
		Classified::Unauthorized { message } => match auth {
			AuthMode::Public => Step::Fail(Error::RequestFailed { status: 401, message }),
			AuthMode::Bearer if !state.auth_retried => Step::Refresh(state.after_refresh()),
			AuthMode::Bearer => Step::Expire,
		},
		Classified::Transient(cause) if state.can_retry_transient(max_retries) =>
			Step::Retry(state.after_transient(), cause),
		Classified::Transient(_) =>
			Step::Fail(Error::ServerUnavailable { attempts: state.attempts() }),
		Classified::Failed { status, message } =>
			Step::Fail(Error::RequestFailed { status, message }),
		Classified::Unreachable(source) => Step::Fail(Error::NetworkUnreachable { source }),
	}
}
