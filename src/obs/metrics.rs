// self
use crate::obs::{CallKind, CallOutcome, TeardownReason};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"convo_client_call_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a transient retry via the global metrics recorder (when enabled).
pub fn record_retry(reason: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("convo_client_retry_total", "reason" => reason).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

/// Records a session teardown via the global metrics recorder (when enabled).
pub fn record_teardown(reason: TeardownReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("convo_client_teardown_total", "reason" => reason.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_call_outcome(CallKind::Request, CallOutcome::Failure);
		record_retry("status_503");
		record_teardown(TeardownReason::RefreshRejected);
	}
}
