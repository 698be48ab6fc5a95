// src/pipeline.rs
use crate::archive;
use crate::edgar::{selector, EdgarClient, SelectionCriteria};
use crate::storage;
use crate::utils::AppError;
use std::path::{Path, PathBuf};

/// Downloads the filing matching `criteria` and returns the path of its
/// primary document inside `output_dir`.
///
/// Steps run in order and the first failure is returned as-is. Nothing is
/// cleaned up after a partial failure; `output_dir` belongs to the caller and
/// must not be shared with a concurrent run.
pub async fn download_filing(
    client: &EdgarClient,
    criteria: &SelectionCriteria,
    output_dir: &Path,
) -> Result<PathBuf, AppError> {
    tracing::info!(
        "Downloading {} filing for CIK {} (report year {}) into {}",
        criteria.form_type,
        criteria.cik,
        criteria.year,
        output_dir.display()
    );

    let manifest = client.fetch_manifest(&criteria.cik).await?;

    let resolved = selector::select(&manifest, &criteria.form_type, criteria.year)?;
    tracing::info!(
        "Selected accession {} with primary document {}",
        resolved.accession_number,
        resolved.primary_document
    );

    let extracted =
        archive::retrieve(client, &criteria.cik, &resolved.accession_number, output_dir).await?;

    let path = storage::locate(&extracted.dir, &resolved.primary_document)?;
    Ok(path)
}
