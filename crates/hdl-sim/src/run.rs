//! Per-test run state and its phase machine.

use crate::error::{Result, SimError};
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Phases of one test run. Transitions only move forward; optional phases may
/// be skipped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Init,
    Cleaned,
    ManifestReady,
    Compiled,
    Simulated,
    LogAwaited,
    Verdicted,
}

/// State of a single test invocation, owned by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestRun {
    /// Test name (directory under `sim/`).
    pub name: String,

    /// Current phase.
    pub phase: Phase,

    /// Completion log, once it has appeared.
    pub log_path: Option<PathBuf>,

    /// Final verdict. `None` until verdicted, and for interactive runs.
    pub verdict: Option<Verdict>,

    /// Lines explaining a non-passing verdict.
    pub diagnostics: Vec<String>,
}

impl TestRun {
    /// Fresh run in phase `Init`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: Phase::Init,
            log_path: None,
            verdict: None,
            diagnostics: Vec::new(),
        }
    }

    /// Move to a later phase.
    pub fn advance(&mut self, next: Phase) -> Result<()> {
        if next <= self.phase {
            return Err(SimError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Enter `Verdicted` with the given outcome.
    pub fn conclude(&mut self, verdict: Verdict, diagnostics: Vec<String>) -> Result<()> {
        self.advance(Phase::Verdicted)?;
        self.verdict = Some(verdict);
        self.diagnostics = diagnostics;
        Ok(())
    }

    /// Whether the run ended with a PASS verdict.
    pub fn passed(&self) -> bool {
        self.verdict == Some(Verdict::Pass)
    }
}
