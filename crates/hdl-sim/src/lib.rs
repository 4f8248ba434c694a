//! HDL-Sim: simulation runs outside the vendor IDE
//!
//! Cleans the simulation workspace, optionally refreshes the test's project
//! file, elaborates and runs the testbench through the toolchain, waits for
//! the completion log and classifies it. Also scans synthesis and
//! implementation logs into a warning summary.

pub mod build_log;
pub mod config;
pub mod error;
pub mod fakes;
pub mod obs;
pub mod orchestrator;
pub mod poll;
pub mod run;
pub mod stage;
pub mod telemetry;
pub mod toolchain;
pub mod vcs;
pub mod verdict;

pub use build_log::{BuildLogAnalyzer, BuildLogClass, LogFindings, WarningSummary};
pub use config::ToolchainConfig;
pub use error::{Result, SimError};
pub use orchestrator::{BatchError, BatchReport, RunOptions, TestOrchestrator};
pub use poll::{wait_for_file, WaitOutcome};
pub use run::{Phase, TestRun};
pub use stage::{ElaborateOptions, SimMode};
pub use telemetry::init_tracing;
pub use toolchain::{ProcessToolchain, ToolInvocation, ToolOutput, Toolchain};
pub use vcs::{GitCleaner, WorkspaceCleaner};
pub use verdict::{LogVerdict, LogVerdictAnalyzer, Verdict, VerdictKeywords};
