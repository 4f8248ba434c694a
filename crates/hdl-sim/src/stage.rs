//! Toolchain stage definitions: elaboration options and viewer launch.

use crate::toolchain::{quote_arg, ToolInvocation};
use hdl_manifest::to_slash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manifest text that signals the global reset/tristate support unit is needed.
pub const GLBL_MARKER: &str = "glbl.v";

/// How the simulation phase runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    /// `-standalone -runall`, followed by log polling and a verdict.
    Headless,

    /// Debug elaboration plus the waveform viewer; no automated verdict.
    Interactive,
}

/// Options passed to the elaborator for one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElaborateOptions {
    /// Test name; the top unit is `<test>_tb`.
    pub test_name: String,

    /// Project file listing the sources.
    pub prj_path: PathBuf,

    /// Whether `work.glbl` is elaborated alongside the testbench.
    pub include_glbl: bool,
}

impl ElaborateOptions {
    /// Derive options, detecting `glbl` from the manifest text.
    pub fn derive(test_name: &str, prj_path: &Path, prj_text: &str) -> Self {
        Self {
            test_name: test_name.to_string(),
            prj_path: prj_path.to_path_buf(),
            include_glbl: prj_text.contains(GLBL_MARKER),
        }
    }

    /// Snapshot / testbench unit name.
    pub fn snapshot(&self) -> String {
        format!("{}_tb", self.test_name)
    }

    /// Elaborator arguments common to both modes.
    pub fn args(&self) -> Vec<String> {
        let snapshot = self.snapshot();
        let mut args = vec![format!("work.{snapshot}")];
        if self.include_glbl {
            args.push("work.glbl".to_string());
        }
        args.extend([
            "-snapshot".to_string(),
            snapshot,
            "-prj".to_string(),
            to_slash(&self.prj_path),
            "-timescale".to_string(),
            "1ns/1ps".to_string(),
            "-L".to_string(),
            "unisims_ver".to_string(),
        ]);
        args
    }

    /// Arguments joined into the option string handed to the elaborator.
    pub fn option_string(&self) -> String {
        self.args()
            .iter()
            .map(|arg| quote_arg(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `xelab` invocation for the given mode.
    pub fn elaborate(&self, mode: SimMode, build_dir: &Path) -> ToolInvocation {
        let mode_args: &[&str] = match mode {
            SimMode::Headless => &["-standalone", "-runall"],
            SimMode::Interactive => &["-debug", "typical"],
        };
        ToolInvocation::new("xelab", build_dir)
            .args(self.args())
            .args(mode_args.iter().copied())
    }

    /// `xsim` invocation opening the viewer on the elaborated snapshot.
    pub fn viewer(&self, build_dir: &Path, viewer_script: &Path) -> ToolInvocation {
        ToolInvocation::new("xsim", build_dir).args([
            self.snapshot(),
            "-gui".to_string(),
            "-t".to_string(),
            to_slash(viewer_script),
        ])
    }
}
