//! Recursive discovery of design files.
//!
//! A scan walks one or more [`ScanRoot`]s, classifies every file by extension
//! and computes the path the manifest will reference. Missing roots are not an
//! error; any other walk failure is.

use crate::category::{ExtensionMap, FileCategory};
use crate::error::ManifestError;
use crate::prioritizer::PriorityMarkers;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A classified design file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Path on disk, as discovered under its scan root.
    pub absolute_path: PathBuf,

    /// Path emitted into the manifest (`/`-separated, prefix included).
    pub relative_path: String,

    /// Category resolved from the extension.
    pub category: FileCategory,

    /// Whether the base name carries a package/interface marker.
    pub is_priority: bool,
}

impl FileRecord {
    /// Create a record, deriving `is_priority` from the base file name.
    pub fn new(
        absolute_path: PathBuf,
        relative_path: String,
        category: FileCategory,
        markers: &PriorityMarkers,
    ) -> Self {
        let is_priority = absolute_path
            .file_name()
            .map(|n| markers.matches(&n.to_string_lossy()))
            .unwrap_or(false);

        Self {
            absolute_path,
            relative_path,
            category,
            is_priority,
        }
    }
}

/// How deep a scan root is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDepth {
    /// Every file below the root.
    Recursive,

    /// Only files directly inside the root (locally overridden files).
    Flat,
}

/// One directory to scan and how its files are addressed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoot {
    /// Directory to walk.
    pub root: PathBuf,

    /// Directory the relative path is computed against.
    pub base: PathBuf,

    /// Literal text prepended to every relative path.
    pub prefix: String,

    /// Walk depth.
    pub depth: ScanDepth,

    /// Optional narrower extension table for this root.
    pub extensions: Option<ExtensionMap>,
}

impl ScanRoot {
    /// Recursive scan of `root`, paths relative to `base`.
    pub fn recursive(root: impl Into<PathBuf>, base: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            root: root.into(),
            base: base.into(),
            prefix: prefix.to_string(),
            depth: ScanDepth::Recursive,
            extensions: None,
        }
    }

    /// Non-recursive scan of `dir`, paths relative to `dir` itself.
    pub fn flat(dir: impl Into<PathBuf>, prefix: &str) -> Self {
        let dir = dir.into();
        Self {
            base: dir.clone(),
            root: dir,
            prefix: prefix.to_string(),
            depth: ScanDepth::Flat,
            extensions: None,
        }
    }

    /// Restrict this root to its own extension table.
    pub fn with_extensions(mut self, extensions: ExtensionMap) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

/// Classifies files found under scan roots.
#[derive(Debug, Clone, Default)]
pub struct FileCollector {
    extensions: ExtensionMap,
    markers: PriorityMarkers,
}

impl FileCollector {
    /// Create a collector with an explicit extension table and marker set.
    pub fn new(extensions: ExtensionMap, markers: PriorityMarkers) -> Self {
        Self {
            extensions,
            markers,
        }
    }

    /// Scan every root in order and accumulate the records.
    ///
    /// Records are returned in walk order (file names sorted per directory);
    /// ordering for the manifest is the job of the prioritizer.
    pub fn collect(&self, roots: &[ScanRoot]) -> Result<Vec<FileRecord>> {
        let mut records = Vec::new();
        for root in roots {
            self.collect_root(root, &mut records)?;
        }
        Ok(records)
    }

    fn collect_root(&self, scan: &ScanRoot, out: &mut Vec<FileRecord>) -> Result<()> {
        if !scan.root.is_dir() {
            debug!(root = %scan.root.display(), "Scan root missing, skipping");
            return Ok(());
        }

        let extensions = scan.extensions.as_ref().unwrap_or(&self.extensions);
        // linked IP directories are walked; a link cycle is a collection error
        let mut walker = WalkDir::new(&scan.root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        if scan.depth == ScanDepth::Flat {
            walker = walker.max_depth(1);
        }

        let before = out.len();
        for entry in walker {
            let entry = entry.map_err(|source| ManifestError::Collection {
                root: scan.root.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(category) = extensions.category_of(path) else {
                continue;
            };

            let relative = format!("{}{}", scan.prefix, relative_to(path, &scan.base));
            out.push(FileRecord::new(
                path.to_path_buf(),
                relative,
                category,
                &self.markers,
            ));
        }

        debug!(
            root = %scan.root.display(),
            files = out.len() - before,
            "Scanned root"
        );
        Ok(())
    }
}

/// Path of `path` relative to `base`, joined with `/`.
///
/// Climbs out of `base` with `..` when `path` is not beneath it. Falls back to
/// `path` itself when no relative form exists (e.g. different drive prefixes).
pub fn relative_to(path: &Path, base: &Path) -> String {
    let rel = pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf());
    to_slash(&rel)
}

/// Render a path with `/` separators regardless of the host convention.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
