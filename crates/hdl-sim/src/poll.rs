//! Bounded wait for a file written asynchronously by the simulator.

use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The file exists.
    Appeared,

    /// The budget ran out first.
    TimedOut,

    /// The token was cancelled first.
    Cancelled,
}

/// Check `path` every `interval` until it exists, `budget` elapses, or
/// `cancel` fires.
///
/// The path is checked once more at the deadline, so a file that lands during
/// the final sleep still counts.
pub async fn wait_for_file(
    path: &Path,
    interval: Duration,
    budget: Duration,
    cancel: &CancellationToken,
) -> WaitOutcome {
    let deadline = Instant::now() + budget;
    let interval = interval.max(Duration::from_millis(1));

    loop {
        if path.exists() {
            return WaitOutcome::Appeared;
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(path = %path.display(), budget_ms = budget.as_millis() as u64, "Wait budget exhausted");
            return WaitOutcome::TimedOut;
        }

        let nap = interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => return WaitOutcome::Cancelled,
            _ = tokio::time::sleep(nap) => {}
        }
    }
}
