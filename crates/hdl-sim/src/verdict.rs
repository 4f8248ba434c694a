//! Simulation log verdicts.
//!
//! Classification is a plain keyword scan: any line mentioning a failure
//! keyword fails the run, even when it only quotes the word (`"0 errors"`).
//! Lines matching an ignore pattern are dropped before scanning.

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Final classification of one test run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    Fail,
    Timeout,
    CompileError,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Timeout => "TIMEOUT",
            Verdict::CompileError => "COMPILE_ERROR",
        };
        f.write_str(s)
    }
}

/// Keyword sets driving [`LogVerdictAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictKeywords {
    /// Any of these (case-insensitive) anywhere in the log fails the run.
    pub failure: Vec<String>,

    /// Lines containing any of these (case-insensitive) are reported.
    pub diagnostic: Vec<String>,
}

impl Default for VerdictKeywords {
    fn default() -> Self {
        Self {
            failure: ["fatal", "error", "critical", "failed"]
                .into_iter()
                .map(String::from)
                .collect(),
            diagnostic: ["fatal", "error"].into_iter().map(String::from).collect(),
        }
    }
}

/// Outcome of classifying a completion log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogVerdict {
    /// `Pass` or `Fail`.
    pub verdict: Verdict,

    /// Trimmed lines matching a diagnostic keyword (empty on pass).
    pub diagnostics: Vec<String>,
}

/// Classifies simulator completion logs.
#[derive(Debug, Clone, Default)]
pub struct LogVerdictAnalyzer {
    keywords: VerdictKeywords,
    ignore: Vec<Regex>,
}

impl LogVerdictAnalyzer {
    pub fn new(keywords: VerdictKeywords) -> Self {
        Self {
            keywords: keywords.lowercased(),
            ignore: Vec::new(),
        }
    }

    /// Skip lines matching `pattern` (e.g. a benign `0 errors` summary).
    pub fn with_ignore(mut self, pattern: &str) -> Result<Self> {
        self.ignore.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Classify a log as PASS or FAIL.
    pub fn classify(&self, log_text: &str) -> LogVerdict {
        let keywords = &self.keywords;
        let lowered: Vec<(String, &str)> = log_text
            .lines()
            .filter(|line| !self.ignore.iter().any(|re| re.is_match(line)))
            .map(|line| (line.to_lowercase(), line))
            .collect();

        let failed = lowered
            .iter()
            .any(|(lower, _)| contains_any(lower, &keywords.failure));

        if !failed {
            return LogVerdict {
                verdict: Verdict::Pass,
                diagnostics: Vec::new(),
            };
        }

        let diagnostics = lowered
            .iter()
            .filter(|(lower, _)| contains_any(lower, &keywords.diagnostic))
            .map(|(_, line)| line.trim().to_string())
            .collect();

        LogVerdict {
            verdict: Verdict::Fail,
            diagnostics,
        }
    }
}

impl VerdictKeywords {
    fn lowercased(self) -> Self {
        Self {
            failure: self.failure.iter().map(|k| k.to_lowercase()).collect(),
            diagnostic: self.diagnostic.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_log_passes() {
        let analyzer = LogVerdictAnalyzer::default();
        let verdict = analyzer.classify("INFO: simulation finished\n$finish called at time : 1 us\n");
        assert_eq!(verdict.verdict, Verdict::Pass);
        assert!(verdict.diagnostics.is_empty());
    }

    #[test]
    fn test_error_line_fails_with_diagnostic() {
        let analyzer = LogVerdictAnalyzer::default();
        let verdict = analyzer.classify("INFO: start\nERROR: mismatch at time 42\nINFO: done\n");
        assert_eq!(verdict.verdict, Verdict::Fail);
        assert_eq!(verdict.diagnostics, vec!["ERROR: mismatch at time 42"]);
    }

    #[test]
    fn test_failed_keyword_fails_without_diagnostics() {
        let analyzer = LogVerdictAnalyzer::default();
        let verdict = analyzer.classify("Test FAILED on vector 3\n");
        assert_eq!(verdict.verdict, Verdict::Fail);
        // "failed" is not in the narrower diagnostic set
        assert!(verdict.diagnostics.is_empty());
    }

    #[test]
    fn test_quoted_keyword_is_still_a_failure() {
        let analyzer = LogVerdictAnalyzer::default();
        let verdict = analyzer.classify("Summary: 0 errors, 0 warnings\n");
        assert_eq!(verdict.verdict, Verdict::Fail);
        assert_eq!(verdict.diagnostics, vec!["Summary: 0 errors, 0 warnings"]);
    }

    #[test]
    fn test_ignored_lines_are_not_scanned() {
        let analyzer = LogVerdictAnalyzer::default()
            .with_ignore(r"^Summary: 0 errors")
            .unwrap();
        assert_eq!(
            analyzer.classify("Summary: 0 errors, 0 warnings\n").verdict,
            Verdict::Pass
        );

        let verdict =
            analyzer.classify("ERROR: mismatch at time 42\nSummary: 0 errors, 0 warnings\n");
        assert_eq!(verdict.verdict, Verdict::Fail);
        assert_eq!(verdict.diagnostics, vec!["ERROR: mismatch at time 42"]);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let err = LogVerdictAnalyzer::default().with_ignore("(").unwrap_err();
        assert!(matches!(err, crate::error::SimError::Pattern(_)));
    }

    #[test]
    fn test_fatal_and_critical() {
        let analyzer = LogVerdictAnalyzer::default();
        let verdict = analyzer.classify("  Fatal: assertion at tb.sv:10  \nCritical Warning: x\n");
        assert_eq!(verdict.verdict, Verdict::Fail);
        assert_eq!(verdict.diagnostics, vec!["Fatal: assertion at tb.sv:10"]);
    }

    #[test]
    fn test_custom_keywords_are_case_insensitive() {
        let analyzer = LogVerdictAnalyzer::new(VerdictKeywords {
            failure: vec!["MISMATCH".to_string()],
            diagnostic: vec!["Mismatch".to_string()],
        });
        assert_eq!(analyzer.classify("error\n").verdict, Verdict::Pass);
        let verdict = analyzer.classify("mismatch on bit 3\n");
        assert_eq!(verdict.verdict, Verdict::Fail);
        assert_eq!(verdict.diagnostics.len(), 1);
    }

    #[test]
    fn test_verdict_display_and_serde() {
        assert_eq!(Verdict::CompileError.to_string(), "COMPILE_ERROR");
        let json = serde_json::to_string(&Verdict::Timeout).unwrap();
        assert_eq!(json, "\"TIMEOUT\"");
        assert!(Verdict::Pass.is_pass());
        assert!(!Verdict::Fail.is_pass());
    }
}
