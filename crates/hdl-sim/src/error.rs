//! Error taxonomy for simulation runs.
//!
//! Compile failures and log timeouts are not errors: they are verdicts on the
//! returned [`TestRun`](crate::run::TestRun) and never abort a batch.

use crate::run::Phase;
use hdl_manifest::ManifestError;
use std::path::PathBuf;

/// Errors that abort an invocation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("workspace cleanup failed: {0}")]
    Cleanup(String),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("test not found: {0}")]
    TestNotFound(String),

    #[error("no tests found in {}", .0.display())]
    NoTests(PathBuf),

    #[error("project file not found: {} (regenerate it with the manifest refresh flag)", .0.display())]
    ProjectFileMissing(PathBuf),

    #[error("invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("log wait cancelled for test {0}")]
    Cancelled(String),

    #[error("log pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Errors confined to one test; a batch records them and continues.
    pub fn is_test_scoped(&self) -> bool {
        matches!(
            self,
            SimError::ProjectFileMissing(_) | SimError::TestNotFound(_) | SimError::Manifest(_)
        )
    }
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
