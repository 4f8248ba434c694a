//! Structured lifecycle events for simulation runs.
//!
//! Events are emitted at `info!` with an `event` field so they can be picked
//! out of JSON log output (`--json`). Filter with `RUST_LOG`.

use crate::run::Phase;
use crate::verdict::Verdict;
use tracing::info;

/// Span tagging everything inside it with the test name.
///
/// Async code attaches it with `tracing::Instrument`; synchronous code can
/// hold a [`TestSpan`] instead.
pub fn test_span(test: &str) -> tracing::Span {
    tracing::info_span!("hdl.test", test = %test)
}

/// RAII guard entering a test-scoped span until dropped.
///
/// ```ignore
/// let _span = TestSpan::enter("uart");
/// // every event below carries test = "uart"
/// ```
pub struct TestSpan {
    _span: tracing::span::EnteredSpan,
}

impl TestSpan {
    pub fn enter(test: &str) -> Self {
        Self {
            _span: test_span(test).entered(),
        }
    }
}

/// Emit event: test run started.
pub fn emit_test_started(test: &str, interactive: bool, refresh_manifest: bool) {
    info!(
        event = "test.started",
        test = %test,
        interactive = interactive,
        refresh_manifest = refresh_manifest,
    );
}

/// Emit event: run entered a phase.
pub fn emit_phase(test: &str, phase: Phase) {
    info!(event = "test.phase", test = %test, phase = ?phase);
}

/// Emit event: run concluded.
pub fn emit_verdict(test: &str, verdict: Verdict, diagnostics: usize, duration_ms: u64) {
    info!(
        event = "test.verdict",
        test = %test,
        verdict = %verdict,
        diagnostics = diagnostics,
        duration_ms = duration_ms,
    );
}

/// Emit event: batch finished with pass/fail counts.
pub fn emit_batch_finished(total: usize, passed: usize, failed: usize) {
    info!(
        event = "batch.finished",
        total = total,
        passed = passed,
        failed = failed,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_and_events_do_not_panic() {
        let _span = TestSpan::enter("uart");
        emit_test_started("uart", false, true);
        emit_phase("uart", Phase::Compiled);
        emit_verdict("uart", Verdict::Pass, 0, 12);
        emit_batch_finished(1, 1, 0);
    }
}
