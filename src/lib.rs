//! Retrieves SEC EDGAR filings and converts filing documents.
//!
//! The core is [`pipeline::download_filing`]: fetch an entity's manifest,
//! select one filing by form type and report year, download and unpack its
//! XBRL archive, and locate the primary document. [`converters`] wraps the
//! HTML-to-PDF renderer and the document-to-text converter, and [`mcp`]
//! exposes all three as tools over stdio.

pub mod archive;
pub mod config;
pub mod converters;
pub mod edgar;
pub mod mcp;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use config::{EdgarConfig, RendererConfig};
pub use edgar::{EdgarClient, FilingManifest, FilingRecord, ResolvedFiling, SelectionCriteria};
pub use pipeline::download_filing;
pub use utils::{AppError, ErrorKind};
