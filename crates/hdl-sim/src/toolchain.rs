//! External toolchain boundary.
//!
//! The orchestrator never spawns processes itself; it hands a
//! [`ToolInvocation`] to a [`Toolchain`] and inspects the [`ToolOutput`].

use crate::error::{Result, SimError};
use async_trait::async_trait;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// One call into the toolchain (`xelab`, `xsim`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Executable name, resolved through the toolchain environment.
    pub program: String,

    /// Arguments in order.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `program arg1 arg2 ...` as a single shell line, quoting words that
    /// the shell would otherwise split or expand.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn is_shell_safe(c: char) -> bool {
    // cmd.exe expands %VAR%, sh does not expand a bare %
    let platform = if cfg!(windows) { '\\' } else { '%' };
    c.is_ascii_alphanumeric() || "_-./=:,+@".contains(c) || c == platform
}

/// Quote one word for the platform shell; plain words pass through.
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_shell_safe) {
        return Cow::Borrowed(arg);
    }
    if cfg!(windows) {
        Cow::Owned(format!("\"{}\"", arg.replace('"', "\"\"")))
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

/// Captured result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code (0 = success, -1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ToolOutput {
    /// Whether the invocation exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stdout lines followed by trimmed stderr lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::trim)
    }
}

/// Runs toolchain invocations.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Run to completion and capture output. A non-zero exit is not an error.
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Spawns real processes, sourcing the toolchain setup script first.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolchain {
    setup_script: Option<PathBuf>,
}

impl ProcessToolchain {
    pub fn new(setup_script: Option<PathBuf>) -> Self {
        Self { setup_script }
    }

    fn command(&self, invocation: &ToolInvocation) -> Command {
        let mut cmd = match &self.setup_script {
            Some(setup) => wrap_with_setup(setup, &invocation.command_line()),
            None => {
                let mut cmd = Command::new(&invocation.program);
                cmd.args(&invocation.args);
                cmd
            }
        };
        cmd.current_dir(&invocation.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[cfg(windows)]
fn wrap_with_setup(setup: &Path, line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    // cmd.exe does its own quote parsing; pass the line through untouched
    let mut cmd = std::process::Command::new("cmd.exe");
    cmd.arg("/c")
        .raw_arg(format!(
            "\"call {} && {}\"",
            quote_arg(&setup.display().to_string()),
            line
        ));
    Command::from(cmd)
}

#[cfg(not(windows))]
fn wrap_with_setup(setup: &Path, line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!(
            ". {} && {}",
            quote_arg(&setup.display().to_string()),
            line
        ));
    cmd
}

#[async_trait]
impl Toolchain for ProcessToolchain {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let start = Instant::now();
        debug!(command = %invocation.command_line(), cwd = %invocation.cwd.display(), "Invoking toolchain");

        let output = self
            .command(invocation)
            .output()
            .await
            .map_err(|source| SimError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
