//! Test orchestration: drives one test through its phases, or every
//! discovered test in sequence.

use crate::config::{ToolchainConfig, NON_TEST_DIRS};
use crate::error::{Result, SimError};
use crate::obs;
use crate::poll::{wait_for_file, WaitOutcome};
use crate::run::{Phase, TestRun};
use crate::stage::{ElaborateOptions, SimMode};
use crate::toolchain::Toolchain;
use crate::vcs::WorkspaceCleaner;
use crate::verdict::{LogVerdictAnalyzer, Verdict};
use hdl_manifest::layout::{generate_simulation_manifest, simulation_manifest_path};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

/// Marker for compile diagnostics in elaborator output.
const COMPILE_ERROR_MARKER: &str = "ERROR";

/// Per-invocation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Headless (verdicted) or interactive (viewer) simulation.
    pub mode: SimMode,

    /// Regenerate the test's project file before compiling.
    pub refresh_manifest: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: SimMode::Headless,
            refresh_manifest: false,
        }
    }
}

impl RunOptions {
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.mode = if interactive {
            SimMode::Interactive
        } else {
            SimMode::Headless
        };
        self
    }

    pub fn refresh_manifest(mut self, refresh: bool) -> Self {
        self.refresh_manifest = refresh;
        self
    }
}

/// A test the batch could not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    /// Test name.
    pub name: String,

    /// Rendered error.
    pub message: String,
}

/// Results of a batch run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Tests that ran to a verdict.
    pub runs: Vec<TestRun>,

    /// Tests that stopped on a test-scoped error. Each counts as failed.
    pub errors: Vec<BatchError>,
}

impl BatchReport {
    /// Number of tests attempted.
    pub fn total(&self) -> usize {
        self.runs.len() + self.errors.len()
    }

    /// Number of tests that passed.
    pub fn passed_count(&self) -> usize {
        self.runs.iter().filter(|r| r.passed()).count()
    }

    /// Number of tests that did not pass, errored ones included.
    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Runs simulation tests against injected collaborators.
pub struct TestOrchestrator {
    config: ToolchainConfig,
    toolchain: Arc<dyn Toolchain>,
    cleaner: Arc<dyn WorkspaceCleaner>,
    analyzer: LogVerdictAnalyzer,
}

impl TestOrchestrator {
    pub fn new(
        config: ToolchainConfig,
        toolchain: Arc<dyn Toolchain>,
        cleaner: Arc<dyn WorkspaceCleaner>,
    ) -> Self {
        Self {
            config,
            toolchain,
            cleaner,
            analyzer: LogVerdictAnalyzer::default(),
        }
    }

    /// Replace the completion-log analyzer.
    pub fn with_analyzer(mut self, analyzer: LogVerdictAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Test names: sub-directories of `sim/` other than `build` and `common`,
    /// sorted. A missing `sim/` yields an empty list.
    pub fn list_tests(&self) -> Result<Vec<String>> {
        let sim_dir = self.config.sim_dir();
        if !sim_dir.is_dir() {
            debug!(sim_dir = %sim_dir.display(), "Simulation directory missing");
            return Ok(Vec::new());
        }

        let mut tests = Vec::new();
        for entry in std::fs::read_dir(&sim_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !NON_TEST_DIRS.contains(&name.as_str()) {
                tests.push(name);
            }
        }
        tests.sort();
        Ok(tests)
    }

    /// Run one test through its phases.
    ///
    /// Compile failures and log timeouts come back as verdicts on the returned
    /// run. Interactive runs stop at `Simulated` without a verdict.
    pub async fn run_test(
        &self,
        name: &str,
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<TestRun> {
        self.drive(name, options, cancel)
            .instrument(obs::test_span(name))
            .await
    }

    async fn drive(
        &self,
        name: &str,
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<TestRun> {
        let start = Instant::now();
        let root = &self.config.project_root;

        if NON_TEST_DIRS.contains(&name) || !self.config.sim_dir().join(name).is_dir() {
            return Err(SimError::TestNotFound(name.to_string()));
        }

        obs::emit_test_started(
            name,
            options.mode == SimMode::Interactive,
            options.refresh_manifest,
        );
        let mut run = TestRun::new(name);

        self.clean_workspace().await?;
        self.enter(&mut run, Phase::Cleaned)?;

        let prj_path = if options.refresh_manifest {
            let path = generate_simulation_manifest(root, name)?;
            self.enter(&mut run, Phase::ManifestReady)?;
            path
        } else {
            simulation_manifest_path(root, name)
        };

        let prj_text = match tokio::fs::read_to_string(&prj_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SimError::ProjectFileMissing(prj_path));
            }
            Err(e) => return Err(e.into()),
        };

        let elaborate = ElaborateOptions::derive(name, &prj_path, &prj_text);
        let build_dir = self.config.build_dir();
        debug!(options = %elaborate.option_string(), "Elaborate options");

        let output = self
            .toolchain
            .run(&elaborate.elaborate(options.mode, &build_dir))
            .await?;

        if !output.success() {
            let diagnostics = output
                .lines()
                .filter(|line| line.contains(COMPILE_ERROR_MARKER))
                .map(str::to_string)
                .collect();
            warn!(exit_code = output.exit_code, "Elaboration failed");
            return self.conclude(run, Verdict::CompileError, diagnostics, start);
        }

        for line in output.lines().filter(|l| l.starts_with("WARNING")) {
            warn!(message = %line, "Elaborator warning");
        }
        self.enter(&mut run, Phase::Compiled)?;

        if options.mode == SimMode::Interactive {
            let viewer = elaborate.viewer(&build_dir, &self.config.viewer_script());
            let output = self.toolchain.run(&viewer).await?;
            if !output.success() {
                warn!(exit_code = output.exit_code, "Viewer exited with an error");
            }
            self.enter(&mut run, Phase::Simulated)?;
            return Ok(run);
        }

        // headless elaboration also ran the simulation
        self.enter(&mut run, Phase::Simulated)?;

        let log_path = self.config.completion_log();
        match wait_for_file(
            &log_path,
            self.config.poll_interval,
            self.config.max_log_wait,
            cancel,
        )
        .await
        {
            WaitOutcome::Appeared => {}
            WaitOutcome::TimedOut => {
                let message = format!(
                    "xsim.log not found after {} seconds",
                    self.config.max_log_wait.as_secs()
                );
                return self.conclude(run, Verdict::Timeout, vec![message], start);
            }
            WaitOutcome::Cancelled => return Err(SimError::Cancelled(name.to_string())),
        }

        run.log_path = Some(log_path.clone());
        self.enter(&mut run, Phase::LogAwaited)?;

        let bytes = tokio::fs::read(&log_path).await?;
        let classified = self.analyzer.classify(&String::from_utf8_lossy(&bytes));
        self.conclude(run, classified.verdict, classified.diagnostics, start)
    }

    /// Run every discovered test headless, one after another.
    ///
    /// Verdicts and test-scoped errors (see [`SimError::is_test_scoped`]) are
    /// recorded and the batch moves on; any other error aborts it.
    pub async fn run_all(
        &self,
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<BatchReport> {
        let tests = self.list_tests()?;
        if tests.is_empty() {
            return Err(SimError::NoTests(self.config.sim_dir()));
        }

        let options = RunOptions {
            mode: SimMode::Headless,
            ..*options
        };

        let mut report = BatchReport::default();
        for name in &tests {
            info!(test = %name, "Running test");
            match self.run_test(name, &options, cancel).await {
                Ok(run) => report.runs.push(run),
                Err(e) if e.is_test_scoped() => {
                    warn!(test = %name, error = %e, "Test could not run");
                    report.errors.push(BatchError {
                        name: name.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        obs::emit_batch_finished(
            report.total(),
            report.passed_count(),
            report.failed_count(),
        );
        Ok(report)
    }

    /// Clean `sim/`, drop any stale completion log, and recreate `sim/build`.
    async fn clean_workspace(&self) -> Result<()> {
        self.cleaner.clean(&self.config.sim_dir()).await?;

        let log = self.config.completion_log();
        if log.exists() {
            tokio::fs::remove_file(&log).await?;
        }
        tokio::fs::create_dir_all(self.config.build_dir()).await?;
        Ok(())
    }

    fn enter(&self, run: &mut TestRun, phase: Phase) -> Result<()> {
        run.advance(phase)?;
        obs::emit_phase(&run.name, phase);
        Ok(())
    }

    fn conclude(
        &self,
        mut run: TestRun,
        verdict: Verdict,
        diagnostics: Vec<String>,
        start: Instant,
    ) -> Result<TestRun> {
        run.conclude(verdict, diagnostics)?;
        obs::emit_verdict(
            &run.name,
            verdict,
            run.diagnostics.len(),
            start.elapsed().as_millis() as u64,
        );
        Ok(run)
    }
}
