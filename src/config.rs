// src/config.rs
use crate::utils::AppError;
use std::time::Duration;

// SEC requires a User-Agent identifying the requester. Override with SEC_USER_AGENT.
pub const DEFAULT_USER_AGENT: &str = "sec-filing-tools admin@example.com";
pub const DEFAULT_DATA_BASE_URL: &str = "https://data.sec.gov";
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://www.sec.gov";
// SEC asks for 10 requests/second max. Be conservative. >100ms delay.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 150;
pub const DEFAULT_RENDERER_BIN: &str = "chromium";

/// Settings for the EDGAR HTTP endpoints.
#[derive(Debug, Clone)]
pub struct EdgarConfig {
    pub user_agent: String,
    /// Host serving `/submissions/CIK##########.json`
    pub data_base_url: String,
    /// Host serving `/Archives/edgar/data/...`
    pub archive_base_url: String,
    /// Pause before each request
    pub request_delay: Duration,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }
}

impl EdgarConfig {
    /// Defaults overridden by `SEC_USER_AGENT`, `SEC_DATA_BASE_URL`,
    /// `SEC_ARCHIVE_BASE_URL` and `SEC_REQUEST_DELAY_MS`.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Ok(agent) = std::env::var("SEC_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(url) = std::env::var("SEC_DATA_BASE_URL") {
            config.data_base_url = url;
        }
        if let Ok(url) = std::env::var("SEC_ARCHIVE_BASE_URL") {
            config.archive_base_url = url;
        }
        if let Ok(raw) = std::env::var("SEC_REQUEST_DELAY_MS") {
            config.request_delay = parse_request_delay(&raw)?;
        }

        Ok(config)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Points both endpoints at the same host (used against mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.data_base_url = base_url.clone();
        self.archive_base_url = base_url;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

/// Parses a delay in whole milliseconds.
pub fn parse_request_delay(raw: &str) -> Result<Duration, AppError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| {
            AppError::Config(format!(
                "SEC_REQUEST_DELAY_MS must be a whole number of milliseconds, got {:?}",
                raw
            ))
        })
}

/// Headless browser used to print HTML to PDF.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub binary: String,
    pub args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_RENDERER_BIN.to_string(),
            args: vec![
                "--headless".to_string(),
                "--disable-gpu".to_string(),
                "--no-pdf-header-footer".to_string(),
            ],
        }
    }
}

impl RendererConfig {
    /// Default arguments with the binary taken from `HTML_RENDERER_BIN` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(binary) = std::env::var("HTML_RENDERER_BIN") {
            config.binary = binary;
        }
        config
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}
