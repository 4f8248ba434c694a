//! Synthesis and implementation log scanning.
//!
//! Unlike simulation logs, vendor build logs are full of benign warnings, so
//! each log class carries an ignore pattern applied before a line counts as a
//! finding. A missing log is reported as such and never treated as a failure.

use crate::error::Result;
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Severity markers a finding must carry. Matched case-sensitively.
pub const SEVERITY_PATTERN: &str = r"CRITICAL|WARNING|ERROR";

/// Known-benign synthesis messages.
pub const DEFAULT_SYNTHESIS_IGNORE: &str = r"\[Constraints\s18-5210\]|\[Netlist\s29-345\]";

/// Absolute Windows prefixes up to the build directory, stripped from reports.
const BUILD_PREFIX_PATTERN: &str = r"[A-Za-z]:\\.*?\\fpga\\build\\";

const SUMMARY_TITLE: &str =
    "Warnings, critical warnings, and errors from synthesis and implementation";

/// Vendor build stages whose logs are scanned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildLogClass {
    Synthesis,
    Implementation,
}

impl BuildLogClass {
    pub const ALL: [BuildLogClass; 2] = [BuildLogClass::Synthesis, BuildLogClass::Implementation];

    /// Run directory inside `<project>.runs/`.
    pub fn run_dir(&self) -> &'static str {
        match self {
            BuildLogClass::Synthesis => "synth_1",
            BuildLogClass::Implementation => "impl_1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildLogClass::Synthesis => "synthesis",
            BuildLogClass::Implementation => "implementation",
        }
    }

    /// First `*.runs/<run>/runme.log` under `build_dir`, by sorted path.
    pub fn locate(&self, build_dir: &Path) -> Option<PathBuf> {
        let base = glob::Pattern::escape(&build_dir.to_string_lossy());
        let pattern = format!("{base}/*.runs/{}/runme.log", self.run_dir());
        let mut hits: Vec<PathBuf> = glob::glob(&pattern).ok()?.flatten().collect();
        hits.sort();
        hits.into_iter().next()
    }
}

/// Scan result for one log class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFindings {
    /// No log exists for this class.
    NoLog,

    /// The log exists and has no findings.
    Clear,

    /// Offending lines, in log order.
    Findings(Vec<String>),
}

impl LogFindings {
    pub fn has_findings(&self) -> bool {
        matches!(self, LogFindings::Findings(lines) if !lines.is_empty())
    }
}

/// Classifies vendor build logs.
#[derive(Debug, Clone)]
pub struct BuildLogAnalyzer {
    severity: Regex,
    synthesis_ignore: Option<Regex>,
    implementation_ignore: Option<Regex>,
    build_prefix: Regex,
}

impl BuildLogAnalyzer {
    /// Analyzer with the default ignore set (synthesis only).
    pub fn new() -> Result<Self> {
        Ok(Self {
            severity: Regex::new(SEVERITY_PATTERN)?,
            synthesis_ignore: Some(Regex::new(DEFAULT_SYNTHESIS_IGNORE)?),
            implementation_ignore: None,
            build_prefix: Regex::new(BUILD_PREFIX_PATTERN)?,
        })
    }

    /// Replace the ignore pattern for one class. An empty pattern ignores nothing.
    pub fn with_ignore(mut self, class: BuildLogClass, pattern: &str) -> Result<Self> {
        let compiled = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern)?)
        };
        match class {
            BuildLogClass::Synthesis => self.synthesis_ignore = compiled,
            BuildLogClass::Implementation => self.implementation_ignore = compiled,
        }
        Ok(self)
    }

    fn ignore_for(&self, class: BuildLogClass) -> Option<&Regex> {
        match class {
            BuildLogClass::Synthesis => self.synthesis_ignore.as_ref(),
            BuildLogClass::Implementation => self.implementation_ignore.as_ref(),
        }
    }

    /// Classify log text for `class`.
    pub fn analyze_text(&self, class: BuildLogClass, text: &str) -> LogFindings {
        let ignore = self.ignore_for(class);
        let findings: Vec<String> = text
            .lines()
            .filter(|line| self.severity.is_match(line))
            .filter(|line| !ignore.is_some_and(|re| re.is_match(line)))
            .map(str::to_string)
            .collect();

        if findings.is_empty() {
            LogFindings::Clear
        } else {
            LogFindings::Findings(findings)
        }
    }

    /// Locate and classify the log for `class` under `build_dir`.
    pub fn analyze(&self, class: BuildLogClass, build_dir: &Path) -> Result<LogFindings> {
        let Some(log) = class.locate(build_dir) else {
            debug!(class = class.label(), build_dir = %build_dir.display(), "No build log");
            return Ok(LogFindings::NoLog);
        };
        let bytes = std::fs::read(&log)?;
        Ok(self.analyze_text(class, &String::from_utf8_lossy(&bytes)))
    }

    /// Scan every class and assemble a report. Absolute build-directory
    /// prefixes are stripped from finding lines.
    pub fn summarize(&self, build_dir: &Path) -> Result<WarningSummary> {
        let mut sections = Vec::with_capacity(BuildLogClass::ALL.len());
        for class in BuildLogClass::ALL {
            let findings = match self.analyze(class, build_dir)? {
                LogFindings::Findings(lines) => LogFindings::Findings(
                    lines
                        .iter()
                        .map(|line| self.build_prefix.replace_all(line, "").into_owned())
                        .collect(),
                ),
                other => other,
            };
            sections.push((class, findings));
        }
        Ok(WarningSummary {
            created: Local::now(),
            sections,
        })
    }
}

/// Warning summary across all build log classes.
#[derive(Debug, Clone)]
pub struct WarningSummary {
    pub created: DateTime<Local>,
    pub sections: Vec<(BuildLogClass, LogFindings)>,
}

impl WarningSummary {
    /// Whether any class reported findings.
    pub fn has_findings(&self) -> bool {
        self.sections.iter().any(|(_, f)| f.has_findings())
    }

    /// Report text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{SUMMARY_TITLE}");
        let _ = writeln!(out, "Created: {}", self.created.format("%Y-%m-%d %H:%M:%S"));

        for (class, findings) in &self.sections {
            let _ = writeln!(out);
            let _ = writeln!(out, "----{}----", class.label().to_uppercase());
            match findings {
                LogFindings::NoLog => {
                    let _ = writeln!(out, "No {} log file found!", class.label());
                }
                LogFindings::Clear => {
                    let _ = writeln!(out, "CLEAR :)");
                }
                LogFindings::Findings(lines) => {
                    for line in lines {
                        let _ = writeln!(out, "{line}");
                    }
                }
            }
        }
        out
    }

    /// Render to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render())?;
        info!(path = %path.display(), findings = self.has_findings(), "Wrote warning summary");
        Ok(())
    }
}
