//! Ordered, categorized file lists ready for serialization.

use crate::category::FileCategory;
use crate::collector::FileRecord;
use crate::prioritizer::{prioritize, sorted_unique};
use std::collections::BTreeMap;

/// Project identity fields written into the script-variable preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// Project name.
    pub name: String,

    /// Top-level design unit.
    pub top_module: String,

    /// Target device part number.
    pub target_device: String,
}

impl ProjectIdentity {
    pub fn new(
        name: impl Into<String>,
        top_module: impl Into<String>,
        target_device: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            top_module: top_module.into(),
            target_device: target_device.into(),
        }
    }
}

/// Mapping from category to its ordered, de-duplicated relative paths.
///
/// The SV category is ordered package/interface first; every other category
/// is plain lexicographic. Building twice from the same records always yields
/// the same manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<FileCategory, Vec<String>>,
}

impl Manifest {
    /// Group records by category and order each group.
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut grouped: BTreeMap<FileCategory, Vec<FileRecord>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.category)
                .or_default()
                .push(record.clone());
        }

        let entries = grouped
            .into_iter()
            .map(|(category, group)| {
                let ordered = if category.is_prioritized() {
                    prioritize(&group)
                } else {
                    sorted_unique(&group)
                };
                (category, ordered)
            })
            .collect();

        Self { entries }
    }

    /// Paths for a category, empty when nothing was discovered.
    pub fn files(&self, category: FileCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
