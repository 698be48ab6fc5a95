// src/edgar/client.rs
use crate::config::EdgarConfig;
use crate::edgar::models::{self, FilingManifest};
use crate::utils::error::EdgarError;
use reqwest::header;

/// HTTP client for the two EDGAR endpoints the pipeline touches.
/// Every request carries the configured User-Agent and is attempted once.
#[derive(Debug, Clone)]
pub struct EdgarClient {
    http: reqwest::Client,
    config: EdgarConfig,
}

impl EdgarClient {
    pub fn new(config: EdgarConfig) -> Result<Self, EdgarError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str()) // Set the required User-Agent
            .build()
            .map_err(EdgarError::ClientBuild)?;
        Ok(Self { http, config })
    }

    pub fn manifest_url(&self, cik: &str) -> String {
        format!(
            "{}{}",
            self.config.data_base_url.trim_end_matches('/'),
            models::manifest_path(cik)
        )
    }

    pub fn archive_url(&self, cik: &str, accession_number: &str) -> String {
        format!(
            "{}{}",
            self.config.archive_base_url.trim_end_matches('/'),
            models::archive_path(cik, accession_number)
        )
    }

    /// Fetches and normalizes the recent-filings manifest of a zero-padded CIK.
    pub async fn fetch_manifest(&self, cik: &str) -> Result<FilingManifest, EdgarError> {
        let url = self.manifest_url(cik);
        tracing::info!("Fetching filing manifest from: {}", url);

        let body = self.get_bytes(&url, "application/json").await?;
        let manifest = FilingManifest::from_submission_json(cik, &body)?;

        tracing::info!(
            "Manifest for CIK {} ({}) lists {} recent filings",
            cik,
            manifest.company_name.as_deref().unwrap_or("unknown company"),
            manifest.records.len()
        );
        Ok(manifest)
    }

    /// Downloads a filing archive into memory.
    pub async fn download_archive(&self, url: &str) -> Result<Vec<u8>, EdgarError> {
        tracing::info!("Downloading archive from: {}", url);
        let body = self.get_bytes(url, "application/zip,*/*").await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    async fn get_bytes(&self, url: &str, accept: &str) -> Result<Vec<u8>, EdgarError> {
        tracing::debug!("Using User-Agent: {}", self.config.user_agent);

        // --- Basic Rate Limiting ---
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }

        let network_error = |source: reqwest::Error| EdgarError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(network_error)?;

        // Check the status before touching the body: an error page is never a result
        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN {
                tracing::warn!("Received 403 Forbidden - check User-Agent and rate limits.");
                return Err(EdgarError::RateLimited(url.to_string()));
            }
            return Err(EdgarError::Http {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(network_error)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        let client =
            EdgarClient::new(EdgarConfig::default().with_base_url("http://localhost:8080/")).unwrap();
        assert_eq!(
            client.manifest_url("0001018724"),
            "http://localhost:8080/submissions/CIK0001018724.json"
        );
        assert_eq!(
            client.archive_url("0001018724", "0001018724-24-000123"),
            "http://localhost:8080/Archives/edgar/data/0001018724/000101872424000123/0001018724-24-000123-xbrl.zip"
        );
    }

    #[test]
    fn test_default_hosts() {
        let client = EdgarClient::new(EdgarConfig::default()).unwrap();
        assert_eq!(
            client.manifest_url("0000320193"),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
        assert!(client
            .archive_url("0000320193", "0000320193-24-000123")
            .starts_with("https://www.sec.gov/Archives/edgar/data/0000320193/"));
    }
}
