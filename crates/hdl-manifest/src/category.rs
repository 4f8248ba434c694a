//! Source file categories and the extension lookup table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Category of a design file, in manifest emission order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileCategory {
    /// SystemVerilog sources (`.sv`)
    Sv,

    /// Verilog sources (`.v`)
    Verilog,

    /// VHDL sources (`.vhd`, `.vhdl`)
    Vhdl,

    /// Timing/pin constraints (`.xdc`)
    Constraint,

    /// Memory initialization data (`.data`)
    MemoryInit,
}

impl FileCategory {
    /// Whether files of this category get the package/interface-first ordering.
    pub fn is_prioritized(&self) -> bool {
        matches!(self, FileCategory::Sv)
    }
}

/// Case-insensitive mapping from file extension to [`FileCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    entries: BTreeMap<String, FileCategory>,
}

impl ExtensionMap {
    /// An empty map; every file is skipped until extensions are added.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Map an extension (without the dot) to a category.
    pub fn with(mut self, extension: &str, category: FileCategory) -> Self {
        self.entries.insert(extension.to_ascii_lowercase(), category);
        self
    }

    /// Extensions used by the simulator project file: SV, Verilog, `.vhd` VHDL.
    pub fn simulation() -> Self {
        Self::empty()
            .with("sv", FileCategory::Sv)
            .with("v", FileCategory::Verilog)
            .with("vhd", FileCategory::Vhdl)
    }

    /// Resolve the category of a path, or `None` when its extension is unmapped.
    pub fn category_of(&self, path: &Path) -> Option<FileCategory> {
        let ext = path.extension()?.to_str()?;
        self.entries.get(&ext.to_ascii_lowercase()).copied()
    }

    /// Keep only the entries whose category satisfies `keep`.
    pub fn restricted_to(&self, keep: impl Fn(FileCategory) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, c)| keep(**c))
                .map(|(e, c)| (e.clone(), *c))
                .collect(),
        }
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::empty()
            .with("sv", FileCategory::Sv)
            .with("v", FileCategory::Verilog)
            .with("vhd", FileCategory::Vhdl)
            .with("vhdl", FileCategory::Vhdl)
            .with("xdc", FileCategory::Constraint)
            .with("data", FileCategory::MemoryInit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_is_case_insensitive() {
        let map = ExtensionMap::default();
        assert_eq!(map.category_of(Path::new("a/top.SV")), Some(FileCategory::Sv));
        assert_eq!(map.category_of(Path::new("a/ram.Data")), Some(FileCategory::MemoryInit));
        assert_eq!(map.category_of(Path::new("pins.XDC")), Some(FileCategory::Constraint));
        assert_eq!(map.category_of(Path::new("x.vhdl")), Some(FileCategory::Vhdl));
    }

    #[test]
    fn test_unmapped_and_missing_extensions() {
        let map = ExtensionMap::default();
        assert_eq!(map.category_of(Path::new("README.md")), None);
        assert_eq!(map.category_of(Path::new("Makefile")), None);
    }

    #[test]
    fn test_simulation_map_skips_vhdl_long_form() {
        let map = ExtensionMap::simulation();
        assert_eq!(map.category_of(Path::new("a.vhd")), Some(FileCategory::Vhdl));
        assert_eq!(map.category_of(Path::new("a.vhdl")), None);
        assert_eq!(map.category_of(Path::new("a.xdc")), None);
    }

    #[test]
    fn test_restricted_to_sv_only() {
        let map = ExtensionMap::default().restricted_to(|c| c == FileCategory::Sv);
        assert_eq!(map.category_of(Path::new("tb.sv")), Some(FileCategory::Sv));
        assert_eq!(map.category_of(Path::new("glbl.v")), None);
    }

    #[test]
    fn test_only_sv_is_prioritized() {
        assert!(FileCategory::Sv.is_prioritized());
        assert!(!FileCategory::Verilog.is_prioritized());
        assert!(!FileCategory::MemoryInit.is_prioritized());
    }
}
