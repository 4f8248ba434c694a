//! HDL Flow - project tooling for HDL designs
//!
//! The `hdlflow` command runs simulations outside the vendor IDE and keeps the
//! generated source manifests up to date.
//!
//! ## Commands
//!
//! - `sim`: list tests, run one test, or run them all
//! - `manifest`: regenerate a test's `.prj` or the FPGA `project_details.tcl`
//! - `warnings`: summarize synthesis/implementation warnings
//! - `clean`: remove git-ignored artifacts from the whole project

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hdl_manifest::{generate_fpga_manifest, generate_simulation_manifest, ProjectIdentity};
use hdl_sim::obs::TestSpan;
use hdl_sim::{
    BuildLogAnalyzer, GitCleaner, LogVerdictAnalyzer, ProcessToolchain, RunOptions, SimError, TestOrchestrator,
    TestRun, ToolchainConfig, Verdict, WorkspaceCleaner,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "hdlflow")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulation and manifest tooling for HDL projects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Project root (holds rtl/, sim/, fpga/)
    #[arg(long, global = true, env = "ROOT_DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run simulations outside the vendor IDE (lists tests when no test is given)
    Sim {
        /// Run the specified test
        #[arg(short = 't', long = "test", conflicts_with = "all")]
        test: Option<String>,

        /// Open the waveform viewer (use with -t)
        #[arg(short = 'g', long = "gui", requires = "test")]
        gui: bool,

        /// Regenerate the test's .prj file before compiling
        #[arg(long = "prj")]
        prj: bool,

        /// Run all available tests
        #[arg(short = 'a', long = "all")]
        all: bool,

        /// Log lines matching this regex never fail a run (repeatable)
        #[arg(long = "ignore", value_name = "REGEX")]
        ignore: Vec<String>,
    },

    /// Regenerate source manifests
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },

    /// Summarize synthesis and implementation warnings into results/
    Warnings,

    /// Remove git-ignored files from the whole project
    Clean,
}

#[derive(Subcommand)]
enum ManifestAction {
    /// Write sim/<test>/<test>.prj
    Prj {
        /// Test name (directory under sim/)
        test: String,
    },

    /// Write fpga/scripts/project_details.tcl
    Tcl {
        /// Project name
        #[arg(long, env = "HDL_PROJECT_NAME")]
        name: String,

        /// Top-level module
        #[arg(long, env = "HDL_TOP_MODULE")]
        top: String,

        /// Target device part number
        #[arg(long, env = "HDL_TARGET_DEVICE")]
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may provide ROOT_DIR and friends; it must be loaded before parsing
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    hdl_sim::init_tracing(cli.json, level);

    let config = load_config(cli.root)?;

    match cli.command {
        Commands::Sim {
            test,
            gui,
            prj,
            all,
            ignore,
        } => {
            let options = RunOptions::default().interactive(gui).refresh_manifest(prj);
            match (test, all) {
                (_, true) => cmd_sim_all(config, &ignore, options).await,
                (Some(test), false) => cmd_sim_test(config, &ignore, &test, options).await,
                (None, false) => cmd_list_tests(config),
            }
        }
        Commands::Manifest { action } => match action {
            ManifestAction::Prj { test } => cmd_manifest_prj(&config, &test),
            ManifestAction::Tcl { name, top, target } => {
                cmd_manifest_tcl(&config, ProjectIdentity::new(name, top, target))
            }
        },
        Commands::Warnings => cmd_warnings(&config),
        Commands::Clean => cmd_clean(&config).await,
    }
}

fn load_config(root: Option<PathBuf>) -> Result<ToolchainConfig> {
    let root = root.ok_or_else(|| {
        SimError::ConfigurationMissing(
            "ROOT_DIR is not set (pass --root or add it to .env)".to_string(),
        )
    })?;
    ToolchainConfig::new(root)
        .with_env_overrides()
        .context("Invalid toolchain configuration")
}

fn orchestrator(config: ToolchainConfig, ignore: &[String]) -> Result<TestOrchestrator> {
    let setup = config.require_setup_script()?.to_path_buf();
    Ok(TestOrchestrator::new(
        config,
        Arc::new(ProcessToolchain::new(Some(setup))),
        Arc::new(GitCleaner),
    )
    .with_analyzer(verdict_analyzer(ignore)?))
}

fn verdict_analyzer(ignore: &[String]) -> Result<LogVerdictAnalyzer> {
    ignore
        .iter()
        .try_fold(LogVerdictAnalyzer::default(), |analyzer, pattern| {
            analyzer
                .with_ignore(pattern)
                .with_context(|| format!("Invalid --ignore pattern {pattern:?}"))
        })
}

/// Token cancelled on Ctrl-C, so a pending log wait ends promptly.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

fn cmd_list_tests(config: ToolchainConfig) -> Result<()> {
    let tests = TestOrchestrator::new(
        config,
        Arc::new(ProcessToolchain::default()),
        Arc::new(GitCleaner),
    )
    .list_tests()?;

    if tests.is_empty() {
        println!("No tests found.");
    } else {
        println!("{}", tests.join("\n"));
    }
    Ok(())
}

async fn cmd_sim_test(
    config: ToolchainConfig,
    ignore: &[String],
    test: &str,
    options: RunOptions,
) -> Result<()> {
    let orchestrator = orchestrator(config, ignore)?;
    let run = orchestrator
        .run_test(test, &options, &interrupt_token())
        .await
        .with_context(|| format!("Simulation of {test} failed to run"))?;

    for line in report_lines(&run) {
        println!("{line}");
    }

    match run.verdict {
        None | Some(Verdict::Pass) => Ok(()),
        Some(verdict) => anyhow::bail!("Test {test} did not pass ({verdict})"),
    }
}

async fn cmd_sim_all(config: ToolchainConfig, ignore: &[String], options: RunOptions) -> Result<()> {
    let orchestrator = orchestrator(config, ignore)?;
    let report = orchestrator
        .run_all(&options, &interrupt_token())
        .await
        .context("Batch simulation failed to run")?;

    for run in &report.runs {
        let status = if run.passed() { "PASSED" } else { "FAILED" };
        println!("Running {}: {}", run.name, status);
    }
    for error in &report.errors {
        println!("Running {}: FAILED ({})", error.name, error.message);
    }
    println!();
    println!(
        "Summary: {}/{} tests passed",
        report.passed_count(),
        report.total()
    );

    if report.all_passed() {
        Ok(())
    } else {
        anyhow::bail!("{} test(s) failed", report.failed_count())
    }
}

/// Console lines describing a finished run.
fn report_lines(run: &TestRun) -> Vec<String> {
    let name = &run.name;
    match run.verdict {
        Some(Verdict::Pass) => vec![format!("[{name}] PASSED")],
        Some(Verdict::Fail) => std::iter::once(format!("[{name}] FAILED"))
            .chain(run.diagnostics.iter().map(|d| format!(">> {d}")))
            .collect(),
        Some(Verdict::CompileError) => std::iter::once(format!("[{name}] FAILED (xelab error)"))
            .chain(run.diagnostics.iter().cloned())
            .collect(),
        Some(Verdict::Timeout) => {
            let reason = run
                .diagnostics
                .first()
                .map(String::as_str)
                .unwrap_or("xsim.log not found");
            vec![format!("[{name}] FAILED ({reason})")]
        }
        None => vec![format!("[{name}] viewer session ended")],
    }
}

fn cmd_manifest_prj(config: &ToolchainConfig, test: &str) -> Result<()> {
    let _span = TestSpan::enter(test);
    if !config.sim_dir().join(test).is_dir() {
        return Err(SimError::TestNotFound(test.to_string()).into());
    }
    let path = generate_simulation_manifest(&config.project_root, test)
        .with_context(|| format!("Failed to generate project file for {test}"))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_manifest_tcl(config: &ToolchainConfig, identity: ProjectIdentity) -> Result<()> {
    let path = generate_fpga_manifest(&config.project_root, &identity)
        .context("Failed to generate FPGA project details")?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_warnings(config: &ToolchainConfig) -> Result<()> {
    let summary = BuildLogAnalyzer::new()?
        .summarize(&config.fpga_build_dir())
        .context("Failed to scan build logs")?;
    let path = config.warning_summary_path();
    summary
        .write(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Log summary saved to {}", path.display());
    Ok(())
}

async fn cmd_clean(config: &ToolchainConfig) -> Result<()> {
    GitCleaner
        .clean(&config.project_root)
        .await
        .context("Project clean failed")?;
    info!(root = %config.project_root.display(), "Project cleaned");
    Ok(())
}
