//! Version-control workspace cleaning.

use crate::error::{Result, SimError};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Removes ignored/untracked build artifacts from a directory.
#[async_trait]
pub trait WorkspaceCleaner: Send + Sync {
    /// Force-remove ignored files and directories under `dir`.
    async fn clean(&self, dir: &Path) -> Result<()>;
}

/// Cleans with `git clean -fXd .`, which only touches git-ignored paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCleaner;

#[async_trait]
impl WorkspaceCleaner for GitCleaner {
    async fn clean(&self, dir: &Path) -> Result<()> {
        let output = Command::new("git")
            .args(["clean", "-fXd", "."])
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| SimError::Cleanup(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SimError::Cleanup(format!(
                "git clean in {} failed: {}",
                dir.display(),
                stderr.trim()
            )));
        }

        debug!(dir = %dir.display(), "Removed ignored files");
        Ok(())
    }
}
