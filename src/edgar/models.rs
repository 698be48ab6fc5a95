// src/edgar/models.rs
use crate::utils::error::EdgarError;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// Top-level shape of the EDGAR submissions document.
/// Example: https://data.sec.gov/submissions/CIK0000320193.json
#[derive(Debug, Deserialize)]
struct CompanySubmission {
    #[serde(default)]
    name: Option<String>,
    filings: Option<Filings>,
}

#[derive(Debug, Deserialize)]
struct Filings {
    recent: Option<Value>,
}

/// Column-oriented `filings.recent`: parallel arrays, index-aligned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingColumns {
    form: Vec<String>,
    report_date: Vec<String>,
    accession_number: Vec<String>,
    primary_document: Vec<String>,
}

/// Row-oriented `filings.recent`: one object per filing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingRow {
    #[serde(alias = "formType")]
    form: String,
    report_date: String,
    accession_number: String,
    primary_document: String,
}

/// One historical filing of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRecord {
    pub form_type: String,
    /// `None` when EDGAR reports no period for the filing.
    pub report_date: Option<NaiveDate>,
    pub accession_number: String,
    pub primary_document: String,
}

/// Every recent filing of one entity, in the order EDGAR returned them.
#[derive(Debug, Clone)]
pub struct FilingManifest {
    pub cik: String,
    pub company_name: Option<String>,
    pub records: Vec<FilingRecord>,
}

/// Inputs of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub cik: String,
    pub year: i32,
    pub form_type: String,
}

impl SelectionCriteria {
    pub fn new(cik: impl Into<String>, year: i32, form_type: impl Into<String>) -> Self {
        Self {
            cik: cik.into(),
            year,
            form_type: form_type.into(),
        }
    }
}

/// The two fields of the selected filing needed downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFiling {
    pub accession_number: String,
    pub primary_document: String,
}

impl FilingManifest {
    /// Parses a submissions document, accepting either shape of `filings.recent`.
    pub fn from_submission_json(cik: &str, body: &[u8]) -> Result<Self, EdgarError> {
        let format_error = |reason: String| EdgarError::DataFormat {
            cik: cik.to_string(),
            reason,
        };

        let submission: CompanySubmission = serde_json::from_slice(body)
            .map_err(|e| format_error(format!("invalid submissions JSON: {}", e)))?;

        let recent = submission
            .filings
            .and_then(|f| f.recent)
            .ok_or_else(|| format_error("missing filings.recent".to_string()))?;

        let rows = match recent {
            Value::Object(_) => {
                let columns: FilingColumns = serde_json::from_value(recent)
                    .map_err(|e| format_error(format!("filings.recent: {}", e)))?;
                columns_to_rows(columns).map_err(format_error)?
            }
            Value::Array(_) => serde_json::from_value::<Vec<FilingRow>>(recent)
                .map_err(|e| format_error(format!("filings.recent: {}", e)))?,
            other => {
                return Err(format_error(format!(
                    "filings.recent must be an object or an array, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let records = rows
            .into_iter()
            .map(|row| -> Result<FilingRecord, EdgarError> {
                let report_date = parse_report_date(&row.report_date).map_err(|reason| {
                    format_error(format!("{} ({})", reason, row.accession_number))
                })?;
                Ok(FilingRecord {
                    form_type: row.form,
                    report_date,
                    accession_number: row.accession_number,
                    primary_document: row.primary_document,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cik: cik.to_string(),
            company_name: submission.name,
            records,
        })
    }
}

fn columns_to_rows(columns: FilingColumns) -> Result<Vec<FilingRow>, String> {
    let len = columns.accession_number.len();
    if columns.form.len() != len
        || columns.report_date.len() != len
        || columns.primary_document.len() != len
    {
        return Err(format!(
            "filings.recent columns differ in length (form={}, reportDate={}, accessionNumber={}, primaryDocument={})",
            columns.form.len(),
            columns.report_date.len(),
            len,
            columns.primary_document.len()
        ));
    }

    Ok(columns
        .form
        .into_iter()
        .zip(columns.report_date)
        .zip(columns.accession_number)
        .zip(columns.primary_document)
        .map(|(((form, report_date), accession_number), primary_document)| FilingRow {
            form,
            report_date,
            accession_number,
            primary_document,
        })
        .collect())
}

fn parse_report_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid reportDate {:?}", raw))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Path of the submissions document for a zero-padded CIK.
pub fn manifest_path(cik: &str) -> String {
    format!("/submissions/CIK{}.json", cik)
}

/// Path of the XBRL archive of a filing. The directory segment drops the
/// hyphens of the accession number, the file name keeps them.
pub fn archive_path(cik: &str, accession_number: &str) -> String {
    let acc_no_dashes = accession_number.replace('-', "");
    format!(
        "/Archives/edgar/data/{}/{}/{}-xbrl.zip",
        cik, acc_no_dashes, accession_number
    )
}
