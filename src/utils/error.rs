// src/utils/error.rs
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// Errors raised while talking to EDGAR or selecting a filing from its manifest
#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for URL: {url}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("SEC rate limit likely exceeded (403 Forbidden) for URL: {0}")]
    RateLimited(String),

    #[error("Unexpected manifest format for CIK {cik}: {reason}")]
    DataFormat { cik: String, reason: String },

    #[error("No {form_type} filing with report year {year} found for CIK {cik}")]
    NoMatch {
        cik: String,
        year: i32,
        form_type: String,
    },
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Invalid or unsupported archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry escapes the output directory: {0}")]
    UnsafeEntry(String),

    #[error("Failed to extract {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: Box<ArchiveError>,
    },

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Primary document {name} not found in {dir}")]
    NotFound { dir: PathBuf, name: String },
}

// Failures of the external format converters; messages are passed through
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("HTML rendering failed: {0}")]
    Render(String),

    #[error("Document conversion failed: {0}")]
    Conversion(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("EDGAR interaction failed: {0}")]
    Edgar(#[from] EdgarError),

    #[error("Archive extraction failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),
}

/// Coarse classification of every failure the crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    DataFormat,
    NoMatch,
    Archive,
    NotFound,
    Render,
    Conversion,
    Io,
    Config,
}

impl ErrorKind {
    /// Only transport and status failures are worth retrying unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "NetworkError",
            ErrorKind::DataFormat => "DataFormatError",
            ErrorKind::NoMatch => "NoMatchError",
            ErrorKind::Archive => "ArchiveError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Render => "RenderError",
            ErrorKind::Conversion => "ConversionError",
            ErrorKind::Io => "IoError",
            ErrorKind::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

impl EdgarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EdgarError::ClientBuild(_)
            | EdgarError::Network { .. }
            | EdgarError::Http { .. }
            | EdgarError::RateLimited(_) => ErrorKind::Network,
            EdgarError::DataFormat { .. } => ErrorKind::DataFormat,
            EdgarError::NoMatch { .. } => ErrorKind::NoMatch,
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) => ErrorKind::Config,
            AppError::Io(_) => ErrorKind::Io,
            AppError::Edgar(e) => e.kind(),
            AppError::Archive(_) => ErrorKind::Archive,
            AppError::Storage(StorageError::NotFound { .. }) => ErrorKind::NotFound,
            AppError::Storage(StorageError::Io { .. }) => ErrorKind::Io,
            AppError::Convert(ConvertError::Render(_)) => ErrorKind::Render,
            AppError::Convert(ConvertError::Conversion(_)) => ErrorKind::Conversion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let no_match: AppError = EdgarError::NoMatch {
            cik: "0001018724".to_string(),
            year: 2024,
            form_type: "8-K".to_string(),
        }
        .into();
        assert_eq!(no_match.kind(), ErrorKind::NoMatch);
        assert!(!no_match.kind().is_retryable());

        let http: AppError = EdgarError::Http {
            url: "https://data.sec.gov/submissions/CIK0000000001.json".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into();
        assert_eq!(http.kind(), ErrorKind::Network);
        assert!(http.kind().is_retryable());

        let missing: AppError = StorageError::NotFound {
            dir: PathBuf::from("out"),
            name: "doc.htm".to_string(),
        }
        .into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let unsafe_entry: AppError = ArchiveError::UnsafeEntry("../../evil".to_string()).into();
        assert_eq!(unsafe_entry.kind(), ErrorKind::Archive);

        let render: AppError = ConvertError::Render("boom".to_string()).into();
        assert_eq!(render.kind(), ErrorKind::Render);
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = EdgarError::NoMatch {
            cik: "0001018724".to_string(),
            year: 2024,
            form_type: "8-K".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No 8-K filing with report year 2024 found for CIK 0001018724"
        );
        assert_eq!(ErrorKind::DataFormat.to_string(), "DataFormatError");
    }
}
