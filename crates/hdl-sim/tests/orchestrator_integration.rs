//! Orchestrator runs against scripted collaborators over a scratch project.

use hdl_sim::fakes::{RecordingCleaner, Reply, ScriptedToolchain};
use hdl_sim::{
    Phase, RunOptions, SimError, SimMode, TestOrchestrator, ToolchainConfig, Verdict,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn touch(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Project with tests `alu`, `spi`, `uart`, each with a hand-written `.prj`.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(root, "rtl/top.sv", "module top; endmodule\n");
    touch(root, "sim/common/clk_gen.sv", "");
    for test in ["alu", "spi", "uart"] {
        touch(root, &format!("sim/{test}/{test}_tb.sv"), "");
        touch(
            root,
            &format!("sim/{test}/{test}.prj"),
            &format!("sv work ./{test}_tb.sv \\\n"),
        );
    }
    fs::create_dir_all(root.join("sim/build")).unwrap();
    dir
}

fn completion_log(root: &Path) -> PathBuf {
    root.join("sim").join("build").join("xsim.log")
}

fn orchestrator(
    root: &Path,
    toolchain: Arc<ScriptedToolchain>,
    cleaner: Arc<RecordingCleaner>,
) -> TestOrchestrator {
    TestOrchestrator::new(ToolchainConfig::new(root), toolchain, cleaner)
}

#[tokio::test]
async fn headless_pass() {
    let dir = project();
    let toolchain = Arc::new(ScriptedToolchain::new().on(
        "work.uart_tb",
        Reply::exit(0).writes(completion_log(dir.path()), "INFO: simulation finished\n"),
    ));
    let cleaner = Arc::new(RecordingCleaner::new());
    let orch = orchestrator(dir.path(), toolchain.clone(), cleaner.clone());

    let run = orch
        .run_test("uart", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.phase, Phase::Verdicted);
    assert_eq!(run.verdict, Some(Verdict::Pass));
    assert!(run.diagnostics.is_empty());
    assert_eq!(run.log_path, Some(completion_log(dir.path())));
    assert_eq!(cleaner.cleaned(), vec![dir.path().join("sim")]);

    let calls = toolchain.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cwd, dir.path().join("sim").join("build"));
    let line = calls[0].command_line();
    assert!(line.starts_with("xelab work.uart_tb -snapshot uart_tb -prj "));
    assert!(line.ends_with("-timescale 1ns/1ps -L unisims_ver -standalone -runall"));
}

#[tokio::test]
async fn headless_fail_reports_diagnostics() {
    let dir = project();
    let toolchain = Arc::new(ScriptedToolchain::new().on(
        "work.uart_tb",
        Reply::exit(0).writes(
            completion_log(dir.path()),
            "INFO: start\nERROR: mismatch at time 42\nINFO: done\n",
        ),
    ));
    let orch = orchestrator(dir.path(), toolchain, Arc::new(RecordingCleaner::new()));

    let run = orch
        .run_test("uart", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.verdict, Some(Verdict::Fail));
    assert_eq!(run.diagnostics, vec!["ERROR: mismatch at time 42"]);
}

#[tokio::test]
async fn compile_failure_short_circuits() {
    let dir = project();
    // a log from a previous run must not be mistaken for this one
    touch(dir.path(), "sim/build/xsim.log", "INFO: stale\n");

    let toolchain = Arc::new(ScriptedToolchain::new().on(
        "xelab",
        Reply::exit(1).stdout(
            "INFO: [VRFC 10-2263] Analyzing SystemVerilog file\n\
             ERROR: [VRFC 10-2989] 'foo' is not declared\n",
        ),
    ));
    let orch = orchestrator(dir.path(), toolchain.clone(), Arc::new(RecordingCleaner::new()));

    let run = orch
        .run_test("uart", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.verdict, Some(Verdict::CompileError));
    assert_eq!(run.phase, Phase::Verdicted);
    assert_eq!(
        run.diagnostics,
        vec!["ERROR: [VRFC 10-2989] 'foo' is not declared"]
    );
    assert!(run.log_path.is_none());
    assert_eq!(toolchain.programs(), vec!["xelab"]);
    assert!(!completion_log(dir.path()).exists());
}

#[tokio::test(start_paused = true)]
async fn missing_log_times_out() {
    let dir = project();
    let toolchain = Arc::new(ScriptedToolchain::new());
    let orch = orchestrator(dir.path(), toolchain, Arc::new(RecordingCleaner::new()));

    let run = orch
        .run_test("uart", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.verdict, Some(Verdict::Timeout));
    assert_eq!(run.diagnostics, vec!["xsim.log not found after 60 seconds"]);
    assert!(run.log_path.is_none());
}

#[tokio::test(start_paused = true)]
async fn timeout_budget_is_configurable() {
    let dir = project();
    let config = ToolchainConfig::new(dir.path())
        .with_max_log_wait(Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(250));
    let orch = TestOrchestrator::new(
        config,
        Arc::new(ScriptedToolchain::new()),
        Arc::new(RecordingCleaner::new()),
    );

    let started = tokio::time::Instant::now();
    let run = orch
        .run_test("uart", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.verdict, Some(Verdict::Timeout));
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test]
async fn cancelled_wait_is_an_error() {
    let dir = project();
    let orch = orchestrator(
        dir.path(),
        Arc::new(ScriptedToolchain::new()),
        Arc::new(RecordingCleaner::new()),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orch
        .run_test("uart", &RunOptions::default(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SimError::Cancelled(name) if name == "uart"));
}

#[tokio::test]
async fn cleanup_failure_aborts_before_toolchain() {
    let dir = project();
    let toolchain = Arc::new(ScriptedToolchain::new());
    let orch = orchestrator(
        dir.path(),
        toolchain.clone(),
        Arc::new(RecordingCleaner::failing()),
    );

    let err = orch
        .run_test("uart", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SimError::Cleanup(_)));
    assert!(toolchain.calls().is_empty());
}

#[tokio::test]
async fn interactive_run_opens_viewer_without_verdict() {
    let dir = project();
    let toolchain = Arc::new(ScriptedToolchain::new());
    let orch = orchestrator(dir.path(), toolchain.clone(), Arc::new(RecordingCleaner::new()));

    let opts = RunOptions::default().interactive(true);
    assert_eq!(opts.mode, SimMode::Interactive);
    let run = orch
        .run_test("uart", &opts, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.phase, Phase::Simulated);
    assert!(run.verdict.is_none());

    let calls = toolchain.calls();
    assert_eq!(toolchain.programs(), vec!["xelab", "xsim"]);
    assert!(calls[0].command_line().ends_with("-debug typical"));
    let viewer = calls[1].command_line();
    assert!(viewer.starts_with("xsim uart_tb -gui -t "));
    assert!(viewer.ends_with("tools/sim_cmd.tcl"));
}

#[tokio::test]
async fn refresh_regenerates_project_file_and_detects_glbl() {
    let dir = project();
    touch(dir.path(), "rtl/legacy/glbl.v", "");
    fs::remove_file(dir.path().join("sim/uart/uart.prj")).unwrap();

    let toolchain = Arc::new(ScriptedToolchain::new().on(
        "work.uart_tb",
        Reply::exit(0).writes(completion_log(dir.path()), "INFO: ok\n"),
    ));
    let orch = orchestrator(dir.path(), toolchain.clone(), Arc::new(RecordingCleaner::new()));

    let run = orch
        .run_test(
            "uart",
            &RunOptions::default().refresh_manifest(true),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(run.passed());

    let prj = fs::read_to_string(dir.path().join("sim/uart/uart.prj")).unwrap();
    assert!(prj.contains("../../rtl/legacy/glbl.v"));
    assert!(prj.contains("./uart_tb.sv"));
    assert!(toolchain.calls()[0]
        .command_line()
        .starts_with("xelab work.uart_tb work.glbl -snapshot uart_tb"));
}

#[tokio::test]
async fn missing_project_file_without_refresh() {
    let dir = project();
    fs::remove_file(dir.path().join("sim/spi/spi.prj")).unwrap();
    let orch = orchestrator(
        dir.path(),
        Arc::new(ScriptedToolchain::new()),
        Arc::new(RecordingCleaner::new()),
    );

    let err = orch
        .run_test("spi", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SimError::ProjectFileMissing(_)));
}

#[tokio::test]
async fn batch_runs_every_test_and_counts_verdicts() {
    let dir = project();
    let log = completion_log(dir.path());
    let toolchain = Arc::new(
        ScriptedToolchain::new()
            .on(
                "work.alu_tb",
                Reply::exit(1).stdout("ERROR: [VRFC 10-2989] 'x' is not declared\n"),
            )
            .on(
                "work.spi_tb",
                Reply::exit(0).writes(&log, "Summary: 0 errors\n"),
            )
            .on(
                "work.uart_tb",
                Reply::exit(0).writes(&log, "INFO: simulation finished\n"),
            ),
    );
    let cleaner = Arc::new(RecordingCleaner::new());
    let orch = orchestrator(dir.path(), toolchain.clone(), cleaner.clone());

    let report = orch
        .run_all(
            &RunOptions::default().interactive(true),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let names: Vec<_> = report.runs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alu", "spi", "uart"]);
    let verdicts: Vec<_> = report.runs.iter().map(|r| r.verdict).collect();
    assert_eq!(
        verdicts,
        vec![
            Some(Verdict::CompileError),
            Some(Verdict::Fail),
            Some(Verdict::Pass)
        ]
    );
    assert_eq!(report.passed_count(), 1);
    assert_eq!(report.failed_count(), 2);
    assert!(!report.all_passed());

    // batch is always headless, and the workspace is cleaned per test
    assert!(toolchain.programs().iter().all(|p| p == "xelab"));
    assert_eq!(cleaner.cleaned().len(), 3);
}

#[tokio::test]
async fn batch_continues_past_test_without_project_file() {
    let dir = project();
    fs::remove_file(dir.path().join("sim/spi/spi.prj")).unwrap();
    let log = completion_log(dir.path());
    let toolchain = Arc::new(
        ScriptedToolchain::new()
            .on(
                "work.alu_tb",
                Reply::exit(0).writes(&log, "INFO: simulation finished\n"),
            )
            .on(
                "work.uart_tb",
                Reply::exit(0).writes(&log, "INFO: simulation finished\n"),
            ),
    );
    let orch = orchestrator(dir.path(), toolchain.clone(), Arc::new(RecordingCleaner::new()));

    let report = orch
        .run_all(&RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<_> = report.runs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alu", "uart"]);
    assert!(report.runs.iter().all(|r| r.passed()));

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].name, "spi");
    assert!(report.errors[0].message.contains("spi.prj"));

    assert_eq!(report.total(), 3);
    assert_eq!(report.passed_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(!report.all_passed());
    assert_eq!(toolchain.programs(), vec!["xelab", "xelab"]);
}

#[tokio::test]
async fn batch_aborts_on_cancellation() {
    let dir = project();
    let orch = orchestrator(
        dir.path(),
        Arc::new(ScriptedToolchain::new()),
        Arc::new(RecordingCleaner::new()),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orch
        .run_all(&RunOptions::default(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SimError::Cancelled(name) if name == "alu"));
}
