//! HDL-Manifest: source manifests for HDL projects
//!
//! Discovers design files under a project tree, orders them so package and
//! interface definitions come first, and serializes the result as either a
//! simulator `.prj` file or a Tcl `project_details.tcl` fragment.
//!
//! ## Flow
//!
//! [`FileCollector`] → [`Manifest`] (via the prioritizer) → [`ManifestWriter`]

pub mod category;
pub mod collector;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod prioritizer;
pub mod writer;

pub use category::{ExtensionMap, FileCategory};
pub use collector::{relative_to, to_slash, FileCollector, FileRecord, ScanDepth, ScanRoot};
pub use error::ManifestError;
pub use layout::{
    fpga_manifest_path, fpga_roots, generate_fpga_manifest, generate_simulation_manifest,
    simulation_manifest_path, simulation_roots,
};
pub use manifest::{Manifest, ProjectIdentity};
pub use prioritizer::{prioritize, PriorityMarkers};
pub use writer::{Dialect, ManifestWriter};

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;
