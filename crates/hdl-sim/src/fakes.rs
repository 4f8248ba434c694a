//! Scripted collaborators for tests.
//!
//! `ScriptedToolchain` answers invocations from a rule list instead of
//! spawning processes, optionally writing a file (the simulator's completion
//! log) as a side effect. `RecordingCleaner` records the directories it was
//! asked to clean.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, SimError};
use crate::toolchain::{ToolInvocation, ToolOutput, Toolchain};
use crate::vcs::WorkspaceCleaner;

// ---------------------------------------------------------------------------
// ScriptedToolchain
// ---------------------------------------------------------------------------

/// Canned answer for matching invocations.
#[derive(Debug, Clone)]
pub struct Reply {
    output: ToolOutput,
    writes: Option<(PathBuf, String)>,
}

impl Reply {
    /// Reply with the given exit code and empty output.
    pub fn exit(code: i32) -> Self {
        Self {
            output: ToolOutput {
                exit_code: code,
                stdout: String::new(),
                stderr: String::new(),
                duration_ms: 0,
            },
            writes: None,
        }
    }

    pub fn stdout(mut self, text: impl Into<String>) -> Self {
        self.output.stdout = text.into();
        self
    }

    pub fn stderr(mut self, text: impl Into<String>) -> Self {
        self.output.stderr = text.into();
        self
    }

    /// Write `contents` to `path` when the reply is served.
    pub fn writes(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.writes = Some((path.into(), contents.into()));
        self
    }
}

/// Toolchain fake driven by `(needle, reply)` rules. The first rule whose
/// needle occurs in the invocation's command line wins; unmatched invocations
/// succeed with no output.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    pub fn on(mut self, needle: impl Into<String>, reply: Reply) -> Self {
        self.rules.push((needle.into(), reply));
        self
    }

    /// Every invocation served so far, in order.
    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Program names of every invocation served so far.
    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

#[async_trait]
impl Toolchain for ScriptedToolchain {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        self.calls.lock().unwrap().push(invocation.clone());

        let line = invocation.command_line();
        let Some((_, reply)) = self.rules.iter().find(|(needle, _)| line.contains(needle.as_str()))
        else {
            return Ok(Reply::exit(0).output);
        };

        if let Some((path, contents)) = &reply.writes {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
        }
        Ok(reply.output.clone())
    }
}

// ---------------------------------------------------------------------------
// RecordingCleaner
// ---------------------------------------------------------------------------

/// Cleaner fake that records directories and optionally fails.
#[derive(Debug, Default)]
pub struct RecordingCleaner {
    cleaned: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cleaner whose every call fails with `Cleanup`.
    pub fn failing() -> Self {
        Self {
            cleaned: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn cleaned(&self) -> Vec<PathBuf> {
        self.cleaned.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkspaceCleaner for RecordingCleaner {
    async fn clean(&self, dir: &Path) -> Result<()> {
        self.cleaned.lock().unwrap().push(dir.to_path_buf());
        if self.fail {
            return Err(SimError::Cleanup(format!(
                "scripted failure in {}",
                dir.display()
            )));
        }
        Ok(())
    }
}
