use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};
use crate::errors::DeviceResult;
use crate::executors::ExecutionOutcome;
use crate::state_management::cancel_signal::CancelSignal;

/// Repeats `attempt` every `interval` until the device acknowledges it.
///
/// Retries are unbounded; each failure is logged as a warning. The cancel signal is observed before
/// every attempt, during the attempt and during the backoff.
pub async fn retry_until_acknowledged<F, Fut>(
    what: &str,
    interval: Duration,
    cancel: &CancelSignal,
    mut attempt: F,
) -> ExecutionOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DeviceResult<()>>,
{
    let mut attempts: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return ExecutionOutcome::Cancelled;
        }
        attempts += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ExecutionOutcome::Cancelled,
            result = attempt() => result,
        };

        match result {
            Ok(()) => {
                info!("{} is successful (attempt {})", what, attempts);
                return ExecutionOutcome::Acknowledged;
            }
            Err(e) => warn!("{} is unsuccessful (attempt {}): {}", what, attempts, e),
        }

        if !sleep_unless_cancelled(interval, cancel).await {
            return ExecutionOutcome::Cancelled;
        }
    }
}

/// Sleeps for `interval`. Returns false, early, if the signal fires first.
pub async fn sleep_unless_cancelled(interval: Duration, cancel: &CancelSignal) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}
