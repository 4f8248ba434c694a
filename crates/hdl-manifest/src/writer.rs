//! Manifest serialization.
//!
//! Two dialects are supported:
//! - [`Dialect::ProjectFile`]: the simulator `.prj` format, one backslash
//!   continued statement per non-empty HDL category.
//! - [`Dialect::ScriptVariables`]: a Tcl fragment with project identity
//!   scalars and one bracketed list per category. Empty categories are kept
//!   as a commented-out template.
//!
//! Paths are written exactly as the collector produced them.

use crate::category::FileCategory;
use crate::error::ManifestError;
use crate::manifest::{Manifest, ProjectIdentity};
use crate::Result;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

const PRJ_HEADER: &str = "\
# List of files defining the modules used during the test.
# This file can be regenerated with `hdlflow sim --prj` or `hdlflow manifest prj`.
# Paths are relative to THIS file.
# For syntax details see AMD Xilinx UG900, \"Project File (.prj) Syntax\".
";

const TCL_HEADER: &str = "\
# Project details required by generate_bitstream.tcl
# This file is regenerated by `hdlflow manifest tcl`; edits will be lost.
# Paths are relative to the fpga/ directory.
";

const RULE: &str = "#-----------------------------------------------------#";

/// `.prj` stanzas in emission order: keyword, continuation indent, and the
/// text closing the stanza. Only `vhdl` closes without a blank line.
const PRJ_STANZAS: [(FileCategory, &str, usize, &str); 3] = [
    (FileCategory::Sv, "sv", 8, " \\\n\n"),
    (FileCategory::Verilog, "verilog", 12, " \\\n\n"),
    (FileCategory::Vhdl, "vhdl", 10, " \\\n"),
];

/// Tcl stanzas in emission order.
const TCL_STANZAS: [(FileCategory, &str, &str, &str); 5] = [
    (
        FileCategory::Constraint,
        "# Specify .xdc files location",
        "xdc_files",
        "path/to/file.xdc",
    ),
    (
        FileCategory::Sv,
        "# Specify SystemVerilog design files location",
        "sv_files",
        "path/to/file.sv",
    ),
    (
        FileCategory::Verilog,
        "# Specify Verilog design files location",
        "verilog_files",
        "path/to/file.v",
    ),
    (
        FileCategory::Vhdl,
        "# Specify VHDL design files location",
        "vhdl_files",
        "path/to/file.vhd",
    ),
    (
        FileCategory::MemoryInit,
        "# Specify files for a memory initialization",
        "mem_files",
        "path/to/file.data",
    ),
];

/// Output format of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// Simulator project file (`.prj`).
    ProjectFile,

    /// Tcl variable assignments, preceded by the project identity.
    ScriptVariables(ProjectIdentity),
}

/// Renders manifests and writes them to disk.
pub struct ManifestWriter;

impl ManifestWriter {
    /// Render a manifest into the given dialect.
    pub fn render(manifest: &Manifest, dialect: &Dialect) -> String {
        match dialect {
            Dialect::ProjectFile => render_project_file(manifest),
            Dialect::ScriptVariables(identity) => render_script_variables(manifest, identity),
        }
    }

    /// Render and write, creating the destination's parent directories.
    pub fn write(manifest: &Manifest, dialect: &Dialect, destination: &Path) -> Result<()> {
        let content = Self::render(manifest, dialect);

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ManifestError::Write {
                path: destination.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(destination, content).map_err(|source| ManifestError::Write {
            path: destination.to_path_buf(),
            source,
        })?;

        debug!(
            path = %destination.display(),
            entries = manifest.len(),
            "Wrote manifest"
        );
        Ok(())
    }
}

fn render_project_file(manifest: &Manifest) -> String {
    let mut out = String::from(PRJ_HEADER);
    out.push('\n');

    for (category, keyword, indent, closing) in PRJ_STANZAS {
        let files = manifest.files(category);
        if files.is_empty() {
            continue;
        }
        let separator = format!(" \\\n{}", " ".repeat(indent));
        out.push_str(keyword);
        out.push_str(" work ");
        out.push_str(&files.join(&separator));
        out.push_str(closing);
    }

    out
}

fn render_script_variables(manifest: &Manifest, identity: &ProjectIdentity) -> String {
    let mut out = String::from(TCL_HEADER);

    // writing to a String cannot fail
    let _ = write!(
        out,
        "\n{RULE}\n#                   Project details                   #\n{RULE}\n\
         # Project name\nset project_name {}\n\n\
         # Top module name\nset top_module {}\n\n\
         # FPGA device\nset target {}\n\n\
         {RULE}\n#                    Design sources                   #\n{RULE}\n",
        identity.name, identity.top_module, identity.target_device
    );

    for (category, comment, var, placeholder) in TCL_STANZAS {
        let files = manifest.files(category);
        out.push_str(comment);
        out.push('\n');
        if files.is_empty() {
            let _ = write!(out, "# set {var} {{\n#     {placeholder}\n# }}\n\n");
        } else {
            let _ = writeln!(out, "set {var} {{");
            for path in files {
                let _ = writeln!(out, "    {path}");
            }
            out.push_str("}\n\n");
        }
    }

    out
}
