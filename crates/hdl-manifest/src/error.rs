//! Error types for hdl-manifest

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting files or writing a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Walking a scan root failed (permissions, broken entries, I/O)
    #[error("failed to scan {}: {source}", root.display())]
    Collection {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The manifest destination could not be created or written
    #[error("failed to write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Whether this error happened while discovering files (as opposed to writing).
    pub fn is_collection(&self) -> bool {
        matches!(self, ManifestError::Collection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        let err = ManifestError::Write {
            path: PathBuf::from("sim/foo/foo.prj"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to write manifest"));
        assert!(msg.contains("foo.prj"));
        assert!(!err.is_collection());
    }
}
