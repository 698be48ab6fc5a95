// src/edgar/mod.rs
pub mod client;
pub mod models;
pub mod selector;

pub use client::EdgarClient;
pub use models::{FilingManifest, FilingRecord, ResolvedFiling, SelectionCriteria};
