// self
use crate::{
	_prelude::*,
	obs::{CallKind, TeardownReason},
	store::StoreError,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("convo_client.call", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a transient retry.
pub fn trace_retry(reason: &'static str, attempt: u32) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(reason, attempt, "retrying transient failure");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reason, attempt);
	}
}

/// Emits a debug event when a 401 hands the call to the refresh stage.
pub fn trace_refresh(coalesced: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(coalesced, "access token rejected; refreshing session");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = coalesced;
	}
}

/// Emits a warning when the session is torn down.
///
/// `store_error` carries the failure of the conditional delete, if any; the session may then
/// still be present in the backend.
pub fn trace_teardown(reason: TeardownReason, store_error: Option<&StoreError>) {
	#[cfg(feature = "tracing")]
	{
		match store_error {
			Some(error) => tracing::error!(
				reason = reason.as_str(),
				%error,
				"session expired but the store failed to drop it; redirecting to login"
			),
			None =>
				tracing::warn!(reason = reason.as_str(), "session expired; redirecting to login"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reason, store_error);
	}
}
