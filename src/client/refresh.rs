//! Session refresh with a singleflight guard, CAS rotation, and metrics.
//!
//! A call that receives a 401 hands the token it sent to [`ApiClient::refresh_session`]. The
//! guard serializes refreshes across every clone of the client; once inside, the call re-reads
//! the session and only exchanges the refresh token if the stored access token is still the
//! one that was rejected. Otherwise another call already rotated it and the new token is
//! reused as-is. Rotations go through
//! [`SessionStore::compare_and_swap_access`](crate::store::SessionStore::compare_and_swap_access)
//! so a stale refresh never overwrites a newer login.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::{ApiClient, pipeline},
	http::{ApiRequest, HttpTransport},
	model::{RefreshRequest, RefreshResponse},
	obs::{self, CallKind, CallOutcome, CallSpan, TeardownReason},
	store::CompareAndSwapOutcome,
};

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Makes sure the session no longer holds `stale`, refreshing it when needed.
	///
	/// Resolves to `Ok(())` when the next attempt should re-send with whatever the store now
	/// holds. Any refresh failure tears the session down and resolves to
	/// [`Error::AuthExpired`].
	pub async fn refresh_session(&self, stale: Option<&TokenSecret>) -> Result<()> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_session");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let Some(current) = self.store.get().await.map_err(|err| {
					self.refresh_metrics.record_failure();

					Error::from(err)
				})?
				else {
					self.refresh_metrics.record_failure();

					return Err(self.expire(None, TeardownReason::SessionMissing).await);
				};

				if stale.is_none_or(|token| !current.holds_access(token.expose())) {
					self.refresh_metrics.record_coalesced();
					obs::trace_refresh(true);

					return Ok(());
				}

				self.refresh_metrics.record_attempt();
				obs::trace_refresh(false);

				let Some(refresh_token) = current.refresh_token.clone() else {
					self.refresh_metrics.record_failure();

					let reason = TeardownReason::RefreshTokenMissing;

					return Err(self.expire(Some(&current.access_token), reason).await);
				};
				let refreshed = match self.exchange_refresh_token(&refresh_token).await {
					Ok(refreshed) => refreshed,
					Err(_) => {
						self.refresh_metrics.record_failure();

						let reason = TeardownReason::RefreshRejected;

						return Err(self.expire(Some(&current.access_token), reason).await);
					},
				};
				let replacement = current.rotated(refreshed.access_token, refreshed.refresh_token);
				let outcome = self
					.store
					.compare_and_swap_access(refresh_token.expose(), replacement)
					.await
					.map_err(|err| {
						self.refresh_metrics.record_failure();

						Error::from(err)
					})?;

				match outcome {
					// A newer login replaced the session; the retry picks up its token.
					CompareAndSwapOutcome::Updated | CompareAndSwapOutcome::RefreshMismatch => {
						self.refresh_metrics.record_success();

						Ok(())
					},
					CompareAndSwapOutcome::Missing => {
						self.refresh_metrics.record_failure();

						Err(self.expire(None, TeardownReason::LoggedOutDuringRefresh).await)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Posts `{ "token": <refresh token> }` to the refresh endpoint, bypassing the pipeline.
	async fn exchange_refresh_token(&self, refresh_token: &TokenSecret) -> Result<RefreshResponse> {
		let request = ApiRequest::post(self.config.refresh_path.as_str())
			.public()
			.with_json(&RefreshRequest { token: refresh_token.expose() })?;
		let request = pipeline::prepare(&self.config, &request)?;
		let response = self
			.http_client
			.send(request)
			.await
			.map_err(|source| Error::NetworkUnreachable { source })?;

		if !response.is_success() {
			return Err(Error::RequestFailed {
				status: response.status,
				message: response.error_message_or_fallback(),
			});
		}

		response.json()
	}
}
