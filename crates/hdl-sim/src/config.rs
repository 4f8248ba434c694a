//! Toolchain and project configuration.
//!
//! Built once at process start and passed by reference; nothing in this crate
//! reads the environment after construction.

use crate::error::{Result, SimError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default ceiling for the completion-log wait.
pub const DEFAULT_MAX_LOG_WAIT: Duration = Duration::from_secs(60);

/// Default interval between completion-log checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Directories under `sim/` that never hold a test.
pub const NON_TEST_DIRS: [&str; 2] = ["build", "common"];

/// Configuration for simulation runs and project paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Project root (holds `rtl/`, `sim/`, `fpga/`, `tools/`).
    pub project_root: PathBuf,

    /// Toolchain environment setup script sourced before every invocation.
    pub setup_script: Option<PathBuf>,

    /// How long to wait for the simulator's completion log.
    pub max_log_wait: Duration,

    /// Interval between completion-log checks.
    pub poll_interval: Duration,
}

impl ToolchainConfig {
    /// Create a configuration with default timings and no setup script.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            setup_script: None,
            max_log_wait: DEFAULT_MAX_LOG_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the toolchain setup script
    pub fn with_setup_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.setup_script = Some(script.into());
        self
    }

    /// Set the completion-log wait ceiling
    pub fn with_max_log_wait(mut self, wait: Duration) -> Self {
        self.max_log_wait = wait;
        self
    }

    /// Set the completion-log poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - ROOT_DIR (required)
    /// - everything [`Self::with_env_overrides`] reads
    pub fn from_env() -> Result<Self> {
        let root = std::env::var("ROOT_DIR").map_err(|_| {
            SimError::ConfigurationMissing("ROOT_DIR is not set".to_string())
        })?;
        let root = root.trim().trim_matches('"');
        if root.is_empty() {
            return Err(SimError::ConfigurationMissing(
                "ROOT_DIR is empty".to_string(),
            ));
        }

        Self::new(root).with_env_overrides()
    }

    /// Apply optional settings from the environment
    ///
    /// Reads:
    /// - VIVADO_SETUP (optional here, see [`Self::require_setup_script`])
    /// - HDL_MAX_LOG_WAIT_SECS (optional, default: 60)
    /// - HDL_POLL_INTERVAL_MS (optional, default: 1000)
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(setup) = std::env::var("VIVADO_SETUP") {
            let setup = setup.trim().trim_matches('"');
            if !setup.is_empty() {
                self = self.with_setup_script(setup);
            }
        }

        if let Some(secs) = parse_env_u64("HDL_MAX_LOG_WAIT_SECS")? {
            self = self.with_max_log_wait(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_env_u64("HDL_POLL_INTERVAL_MS")? {
            self = self.with_poll_interval(Duration::from_millis(ms));
        }

        Ok(self)
    }

    /// The setup script, or `ConfigurationMissing` when simulation cannot run without it.
    pub fn require_setup_script(&self) -> Result<&Path> {
        self.setup_script.as_deref().ok_or_else(|| {
            SimError::ConfigurationMissing("VIVADO_SETUP is not set".to_string())
        })
    }

    /// `<root>/sim`
    pub fn sim_dir(&self) -> PathBuf {
        self.project_root.join("sim")
    }

    /// `<root>/sim/build`, the elaboration working directory.
    pub fn build_dir(&self) -> PathBuf {
        self.sim_dir().join("build")
    }

    /// Completion log written by the simulator.
    pub fn completion_log(&self) -> PathBuf {
        self.build_dir().join("xsim.log")
    }

    /// Tcl script handed to the interactive viewer.
    pub fn viewer_script(&self) -> PathBuf {
        self.project_root.join("tools").join("sim_cmd.tcl")
    }

    /// `<root>/fpga/build`, where synthesis/implementation runs live.
    pub fn fpga_build_dir(&self) -> PathBuf {
        self.project_root.join("fpga").join("build")
    }

    /// Destination of the build-log warning summary.
    pub fn warning_summary_path(&self) -> PathBuf {
        self.project_root.join("results").join("warning_summary.log")
    }
}

fn parse_env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SimError::ConfigurationMissing(format!("{key} is not a number: {raw}"))),
        Err(_) => Ok(None),
    }
}
