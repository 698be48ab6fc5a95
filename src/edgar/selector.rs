// src/edgar/selector.rs
use crate::edgar::models::{FilingManifest, FilingRecord, ResolvedFiling};
use crate::utils::error::EdgarError;
use chrono::{Datelike, NaiveDate};

/// Picks the filing of `form_type` whose report date falls in `year`.
///
/// Candidates are re-sorted by report date, newest first, rather than trusting
/// EDGAR's ordering. The sort is stable, so filings reported on the same day
/// keep their manifest order and the first of them wins.
pub fn select(
    manifest: &FilingManifest,
    form_type: &str,
    year: i32,
) -> Result<ResolvedFiling, EdgarError> {
    let mut candidates: Vec<(NaiveDate, &FilingRecord)> = manifest
        .records
        .iter()
        .filter(|record| record.form_type == form_type)
        .filter_map(|record| record.report_date.map(|date| (date, record)))
        .filter(|(date, _)| date.year() == year)
        .collect();

    tracing::debug!(
        "{} candidate {} filings for CIK {} in {}",
        candidates.len(),
        form_type,
        manifest.cik,
        year
    );

    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    let (report_date, selected) = candidates.first().copied().ok_or_else(|| EdgarError::NoMatch {
        cik: manifest.cik.clone(),
        year,
        form_type: form_type.to_string(),
    })?;

    if candidates.len() > 1 {
        tracing::info!(
            "Selected {} (reported {}) out of {} matching filings",
            selected.accession_number,
            report_date,
            candidates.len()
        );
    }

    Ok(ResolvedFiling {
        accession_number: selected.accession_number.clone(),
        primary_document: selected.primary_document.clone(),
    })
}
