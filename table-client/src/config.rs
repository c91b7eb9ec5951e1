//! Client configuration

use crate::{ClientError, ClientResult, NetworkOrderApi};
use std::time::Duration;

/// Default order service address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Default number of tables on the board
pub const DEFAULT_TABLE_COUNT: usize = 16;

/// Client configuration for connecting to the order service
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BACKEND_URL | http://localhost:8080 | Order service base URL |
/// | TABLE_COUNT | 16 | Number of tables |
/// | REQUEST_TIMEOUT_SECS | 30 | Per-request timeout |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Number of tables, fixed for the life of a store
    pub table_count: usize,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            table_count: DEFAULT_TABLE_COUNT,
            timeout: 30,
        }
    }

    /// Load configuration from environment variables, using defaults for unset values
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BACKEND_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            table_count: std::env::var("TABLE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_TABLE_COUNT),
            timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Set the number of tables
    pub fn with_table_count(mut self, count: usize) -> Self {
        self.table_count = count;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Check the settings the client cannot work without
    pub fn validate(&self) -> ClientResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.table_count == 0 {
            return Err(ClientError::Config("table_count must be at least 1".into()));
        }
        Ok(())
    }

    /// Bound for each HTTP request and for the push channel handshake
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Push channel address derived from the base URL (http -> ws, https -> wss)
    pub fn push_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws_base}/ws")
    }

    /// Create an HTTP order API client from this configuration
    pub fn build_api(&self) -> ClientResult<NetworkOrderApi> {
        self.validate()?;
        NetworkOrderApi::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
