//! Project layout presets.
//!
//! A project root `R` is expected to look like:
//!
//! ```text
//! R/rtl/                 design sources (recursive)
//! R/sim/common/          shared testbench sources
//! R/sim/<test>/          one directory per test, holding <test>.prj
//! R/fpga/constraints/    .xdc files
//! R/fpga/rtl/            board-specific sources
//! R/fpga/scripts/        generated project_details.tcl
//! ```

use crate::category::{ExtensionMap, FileCategory};
use crate::collector::{FileCollector, ScanRoot};
use crate::manifest::{Manifest, ProjectIdentity};
use crate::prioritizer::PriorityMarkers;
use crate::writer::{Dialect, ManifestWriter};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Scan roots for the simulation project file of `test_name`.
pub fn simulation_roots(project_root: &Path, test_name: &str) -> Vec<ScanRoot> {
    let sim_dir = project_root.join("sim");
    let sv_only = ExtensionMap::simulation().restricted_to(|c| c == FileCategory::Sv);

    vec![
        ScanRoot::recursive(project_root.join("rtl"), project_root, "../../"),
        ScanRoot::recursive(sim_dir.join("common"), &sim_dir, "../"),
        ScanRoot::flat(sim_dir.join(test_name), "./").with_extensions(sv_only),
    ]
}

/// Location of the simulation project file for `test_name`.
pub fn simulation_manifest_path(project_root: &Path, test_name: &str) -> PathBuf {
    project_root
        .join("sim")
        .join(test_name)
        .join(format!("{test_name}.prj"))
}

/// Scan roots for the FPGA build manifest.
pub fn fpga_roots(project_root: &Path) -> Vec<ScanRoot> {
    let fpga_dir = project_root.join("fpga");
    vec![
        ScanRoot::recursive(fpga_dir.join("constraints"), &fpga_dir, ""),
        ScanRoot::recursive(fpga_dir.join("rtl"), &fpga_dir, ""),
        ScanRoot::recursive(project_root.join("rtl"), &fpga_dir, ""),
    ]
}

/// Location of the generated FPGA project details script.
pub fn fpga_manifest_path(project_root: &Path) -> PathBuf {
    project_root
        .join("fpga")
        .join("scripts")
        .join("project_details.tcl")
}

/// Collect, order and write the `.prj` for one test. Returns the written path.
pub fn generate_simulation_manifest(project_root: &Path, test_name: &str) -> Result<PathBuf> {
    let collector = FileCollector::new(ExtensionMap::simulation(), PriorityMarkers::default());
    let records = collector.collect(&simulation_roots(project_root, test_name))?;
    let manifest = Manifest::from_records(&records);

    let path = simulation_manifest_path(project_root, test_name);
    ManifestWriter::write(&manifest, &Dialect::ProjectFile, &path)?;
    info!(test = %test_name, files = manifest.len(), path = %path.display(), "Updated simulation manifest");
    Ok(path)
}

/// Collect, order and write the FPGA project details script. Returns the written path.
pub fn generate_fpga_manifest(project_root: &Path, identity: &ProjectIdentity) -> Result<PathBuf> {
    let collector = FileCollector::new(ExtensionMap::default(), PriorityMarkers::default());
    let records = collector.collect(&fpga_roots(project_root))?;
    let manifest = Manifest::from_records(&records);

    let path = fpga_manifest_path(project_root);
    ManifestWriter::write(
        &manifest,
        &Dialect::ScriptVariables(identity.clone()),
        &path,
    )?;
    info!(files = manifest.len(), path = %path.display(), "Updated FPGA project details");
    Ok(path)
}
