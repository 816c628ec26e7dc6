//! Authenticated HTTP client: bearer injection, single-shot refresh on 401, and bounded
//! transient retries.
//!
//! [`ApiClient::request`] drives one logical call through the stages in [`pipeline`]. The
//! session is re-read from the [`SessionStore`] before every send, so a refresh performed by a
//! concurrent call is picked up by the next attempt. Refreshes are coalesced behind a single
//! async guard (see [`refresh`]).

pub mod pipeline;
pub mod refresh;
pub mod retry;

pub use refresh::RefreshMetrics;
pub use retry::RetryState;

// self
#[cfg(feature = "reqwest")] use crate::{http::ReqwestHttpClient, navigation::NoopRedirect};
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
	client::pipeline::{Authorized, Step},
	config::ClientConfig,
	http::{ApiRequest, ApiResponse, HttpTransport},
	navigation::LoginRedirect,
	obs::{self, CallKind, CallOutcome, CallSpan, TeardownReason},
	store::SessionStore,
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Authenticated client for the Convo backend.
///
/// Clones share the transport, the session store, the redirect collaborator, and the refresh
/// guard, so concurrent calls issued through any clone coalesce their refreshes.
pub struct ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request, including refreshes.
	pub http_client: Arc<C>,
	/// Backend holding the current session.
	pub store: Arc<dyn SessionStore>,
	/// Collaborator told to navigate to the login entry point on `AuthExpired`.
	pub redirect: Arc<dyn LoginRedirect>,
	/// Endpoint, timeout, and retry configuration.
	pub config: ClientConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport and collaborators.
	pub fn with_http_client(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		http_client: impl Into<Arc<C>>,
		redirect: Arc<dyn LoginRedirect>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			redirect,
			config,
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Replaces the login redirect collaborator.
	pub fn with_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
		self.redirect = redirect;

		self
	}

	/// Returns the current session without touching the network.
	pub async fn session(&self) -> Result<Option<Session>> {
		Ok(self.store.get().await?)
	}

	/// Performs one logical call and resolves it exactly once.
	///
	/// Non-2xx statuses never come back as `Ok`; they surface as the matching [`Error`].
	pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "request");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.run(&request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Same as [`ApiClient::request`], decoding the success body as JSON.
	pub async fn request_json<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.request(request).await?.json()
	}

	async fn run(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let prepared = pipeline::prepare(&self.config, request)?;
		let mut state = RetryState::default();

		loop {
			let session = self.store.get().await?;
			let Authorized { request: outgoing, sent_token } =
				pipeline::inject_auth(prepared.clone(), request.auth, session.as_ref());
			let outcome = self.http_client.send(outgoing).await;

			match pipeline::decide(
				pipeline::classify(outcome),
				state,
				self.config.max_retries,
				request.auth,
			) {
				Step::Return(response) => return Ok(response),
				Step::Refresh(next) => {
					self.refresh_session(sent_token.as_ref()).await?;

					state = next;
				},
				Step::Retry(next, cause) => {
					obs::record_retry(cause.as_str());
					obs::trace_retry(cause.as_str(), next.transient_retries);

					state = next;
				},
				Step::Expire =>
					return Err(
						self.expire(sent_token.as_ref(), TeardownReason::RejectedAfterRefresh).await
					),
				Step::Fail(err) => return Err(err),
			}
		}
	}

	/// Tears the session down and tells the UI to go back to the login entry point.
	///
	/// Only a session still holding `rejected` is removed; a newer login survives. A storage
	/// failure is reported through the teardown trace and the call still ends in `AuthExpired`.
	pub(crate) async fn expire(
		&self,
		rejected: Option<&TokenSecret>,
		reason: TeardownReason,
	) -> Error {
		let store_error = match rejected {
			Some(token) => self.store.revoke(token.expose()).await.err(),
			None => None,
		};

		obs::record_teardown(reason);
		obs::trace_teardown(reason, store_error.as_ref());
		self.redirect.redirect_to_login(&self.config.login_path);

		Error::AuthExpired
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport and a no-op redirect.
	///
	/// Use [`ApiClient::with_redirect`] to plug in the UI's navigation hook.
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
		Self::with_http_client(config, store, ReqwestHttpClient::default(), Arc::new(NoopRedirect))
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			redirect: self.redirect.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
