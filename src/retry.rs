use std::time::Duration;

use backon::{BlockingRetryable as _, ConstantBuilder};
use tracing::error;

use crate::forwarder::SendError;

/// Total attempts per host, including the initial one.
pub(crate) const MAX_SEND_ATTEMPTS: usize = 2;

/// Runs `op` under the bounded timeout-retry policy.
///
/// Timeout-class failures are retried up to [`MAX_SEND_ATTEMPTS`] and, once
/// exhausted, logged and discarded: emitting a metric must never raise into
/// the caller's control flow over a transient network hiccup. Every other
/// failure class propagates on its first occurrence, unretried.
pub(crate) fn send_with_retry<F>(op: F) -> Result<(), SendError>
where
    F: FnMut() -> Result<(), SendError>,
{
    let policy = ConstantBuilder::default()
        .with_delay(Duration::ZERO)
        .with_max_times(MAX_SEND_ATTEMPTS - 1);

    match op.retry(policy).when(SendError::is_timeout).call() {
        Err(err) if err.is_timeout() => {
            error!(error = %err, "Dropping signal after repeated send timeouts.");
            Ok(())
        }
        result => result,
    }
}
