// src/storage/mod.rs
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

/// Creates `dir` and any missing parents. An existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Finds `primary_document` directly inside `dir`.
///
/// Only the top level is scanned and names are compared exactly, matching the
/// flat layout of EDGAR XBRL archives.
pub fn locate(dir: &Path, primary_document: &str) -> Result<PathBuf, StorageError> {
    let io_error = |source: std::io::Error| StorageError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        if entry.file_name() == primary_document {
            let path = entry.path();
            tracing::info!("Located primary document: {}", path.display());
            return Ok(path);
        }
    }

    tracing::warn!("{} not present in {}", primary_document, dir.display());
    Err(StorageError::NotFound {
        dir: dir.to_path_buf(),
        name: primary_document.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("html").join("amzn_2024_8_k");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_locate_top_level_exact_match() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("amzn-20240101.htm"), "<html></html>").unwrap();
        fs::write(tmp.path().join("amzn-20240101.xsd"), "").unwrap();

        let found = locate(tmp.path(), "amzn-20240101.htm").unwrap();
        assert_eq!(found, tmp.path().join("amzn-20240101.htm"));
    }

    #[test]
    fn test_locate_is_case_sensitive_and_not_recursive() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("AMZN-20240101.htm"), "").unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("amzn-20240101.htm"), "").unwrap();

        let err = locate(tmp.path(), "amzn-20240101.htm").unwrap_err();
        assert!(matches!(err, StorageError::NotFound { ref name, .. } if name == "amzn-20240101.htm"));
    }

    #[test]
    fn test_locate_missing_dir_is_io_error() {
        let tmp = tempdir().unwrap();
        let err = locate(&tmp.path().join("absent"), "a.htm").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
