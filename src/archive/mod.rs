// src/archive/mod.rs
use crate::edgar::EdgarClient;
use crate::storage;
use crate::utils::error::{AppError, ArchiveError};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// A directory holding the unpacked contents of one filing archive.
/// The caller owns its retention.
#[derive(Debug, Clone)]
pub struct ExtractedArchive {
    pub dir: PathBuf,
}

/// Downloads the XBRL archive of a filing and unpacks it into `output_dir`.
pub async fn retrieve(
    client: &EdgarClient,
    cik: &str,
    accession_number: &str,
    output_dir: &Path,
) -> Result<ExtractedArchive, AppError> {
    storage::ensure_dir(output_dir)?;

    let url = client.archive_url(cik, accession_number);
    let bytes = client.download_archive(&url).await?;

    let files = extract_archive(&bytes, output_dir).map_err(|source| ArchiveError::Extract {
        url: url.clone(),
        source: Box::new(source),
    })?;
    tracing::info!(
        "Extracted {} files from {} into {}",
        files.len(),
        url,
        output_dir.display()
    );

    Ok(ExtractedArchive {
        dir: output_dir.to_path_buf(),
    })
}

/// Unpacks a zip archive held in memory into `output_dir`, overwriting files
/// that already exist.
///
/// Every entry name is checked before anything is written: an entry that is
/// absolute or climbs out through `..` rejects the whole archive.
pub fn extract_archive(bytes: &[u8], output_dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
        entries.push((i, relative, entry.is_dir()));
    }

    let io_error = |path: &Path, source: io::Error| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut written = Vec::new();
    for (i, relative, is_dir) in entries {
        let target = output_dir.join(&relative);

        if is_dir {
            fs::create_dir_all(&target).map_err(|e| io_error(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let mut entry = zip.by_index(i)?;
        let mut out = fs::File::create(&target).map_err(|e| io_error(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| io_error(&target, e))?;

        tracing::debug!("Extracted {}", target.display());
        written.push(target);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extracts_flat_archive() {
        let tmp = tempdir().unwrap();
        let bytes = build_zip(&[
            ("amzn-20240101.htm", "<html>8-K</html>"),
            ("amzn-20240101.xsd", "<schema/>"),
        ]);

        let files = extract_archive(&bytes, tmp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(
            fs::read_to_string(tmp.path().join("amzn-20240101.htm")).unwrap(),
            "<html>8-K</html>"
        );
    }

    #[test]
    fn test_extraction_overwrites_existing_files() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("doc.htm"), "stale contents that are longer").unwrap();

        extract_archive(&build_zip(&[("doc.htm", "fresh")]), tmp.path()).unwrap();
        extract_archive(&build_zip(&[("doc.htm", "fresh")]), tmp.path()).unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("doc.htm")).unwrap(), "fresh");
    }

    #[test]
    fn test_rejects_path_traversal_before_writing() {
        let tmp = tempdir().unwrap();
        let output = tmp.path().join("a").join("b");
        let bytes = build_zip(&[("ok.htm", "fine"), ("../../evil", "pwned")]);

        let err = extract_archive(&bytes, &output).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsafeEntry(ref name) if name == "../../evil"));
        assert!(!tmp.path().join("evil").exists());
        assert!(!output.join("ok.htm").exists());
    }

    #[test]
    fn test_corrupt_archive() {
        let tmp = tempdir().unwrap();
        let err = extract_archive(b"definitely not a zip file", tmp.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }
}
