//! Package/interface-first ordering of source files.
//!
//! Definitions of packages and interfaces must reach the compiler before the
//! modules that import them. Without a dependency graph the cheapest stand-in
//! is a naming convention: any file whose base name carries one of the marker
//! substrings is emitted ahead of the rest.

use crate::collector::FileRecord;
use std::collections::BTreeSet;

/// Marker substrings that flag a file as a package or interface definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityMarkers {
    markers: Vec<String>,
}

impl PriorityMarkers {
    /// Build a marker set from arbitrary substrings.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a base file name contains any marker (case-sensitive).
    pub fn matches(&self, file_name: &str) -> bool {
        self.markers.iter().any(|m| file_name.contains(m.as_str()))
    }

    /// The configured markers.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for PriorityMarkers {
    fn default() -> Self {
        Self::new(["_pkg", "_if"])
    }
}

/// Order records as `sorted(priority) ++ sorted(rest)`, collapsing duplicate
/// relative paths.
///
/// Priority comes from [`FileRecord::is_priority`], which was derived from the
/// base name at collection time, so a directory called `bus_if/` does not
/// promote the files beneath it.
pub fn prioritize(records: &[FileRecord]) -> Vec<String> {
    let mut priority = BTreeSet::new();
    let mut rest = BTreeSet::new();

    for record in records {
        if record.is_priority {
            priority.insert(record.relative_path.as_str());
        } else {
            rest.insert(record.relative_path.as_str());
        }
    }

    priority
        .into_iter()
        .chain(rest.into_iter())
        .map(str::to_string)
        .collect()
}

/// Plain lexicographic ordering with duplicates collapsed.
pub fn sorted_unique(records: &[FileRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.relative_path.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FileCategory;
    use std::path::PathBuf;

    fn record(rel: &str, markers: &PriorityMarkers) -> FileRecord {
        FileRecord::new(PathBuf::from(rel), rel.to_string(), FileCategory::Sv, markers)
    }

    #[test]
    fn test_default_markers() {
        let markers = PriorityMarkers::default();
        assert!(markers.matches("alu_pkg.sv"));
        assert!(markers.matches("vga_if.sv"));
        assert!(!markers.matches("top.sv"));
        // case-sensitive
        assert!(!markers.matches("ALU_PKG.sv"));
    }

    #[test]
    fn test_priority_group_first() {
        let m = PriorityMarkers::default();
        let records = vec![
            record("../../rtl/top.sv", &m),
            record("../../rtl/z_pkg.sv", &m),
            record("../../rtl/adder.sv", &m),
            record("../common/bus_if.sv", &m),
        ];

        let ordered = prioritize(&records);
        assert_eq!(
            ordered,
            vec![
                "../../rtl/z_pkg.sv",
                "../common/bus_if.sv",
                "../../rtl/adder.sv",
                "../../rtl/top.sv",
            ]
        );
    }

    #[test]
    fn test_marker_in_directory_does_not_promote() {
        let m = PriorityMarkers::default();
        let records = vec![
            record("rtl/bus_if/decoder.sv", &m),
            record("rtl/a.sv", &m),
        ];
        assert_eq!(prioritize(&records), vec!["rtl/a.sv", "rtl/bus_if/decoder.sv"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let m = PriorityMarkers::default();
        let records = vec![
            record("./tb.sv", &m),
            record("./tb.sv", &m),
            record("./tb_pkg.sv", &m),
            record("./tb_pkg.sv", &m),
        ];
        assert_eq!(prioritize(&records), vec!["./tb_pkg.sv", "./tb.sv"]);
        assert_eq!(sorted_unique(&records), vec!["./tb.sv", "./tb_pkg.sv"]);
    }

    #[test]
    fn test_custom_markers() {
        let m = PriorityMarkers::new(["_types"]);
        let records = vec![record("b.sv", &m), record("a_types.sv", &m), record("a_pkg.sv", &m)];
        assert_eq!(prioritize(&records), vec!["a_types.sv", "a_pkg.sv", "b.sv"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(prioritize(&[]).is_empty());
    }
}
