//! Server configuration management

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Directory holding repositories as `{namespace}/{name}`
    pub repository_root: PathBuf,

    /// API base used when building links, e.g. `/api` or `https://scm.example.com/api`
    pub base_url: String,

    /// Number of repositories scanned concurrently
    pub scan_concurrency: usize,

    /// Timeout for a whole request in seconds
    pub request_timeout_seconds: u64,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ApiError::Config(format!("Invalid {} value", name)))
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let scan_concurrency: usize = parse_var("SCAN_CONCURRENCY", "4")?;
        if scan_concurrency == 0 {
            return Err(ApiError::Config(
                "SCAN_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", "3000")?,
            repository_root: std::env::var("REPOSITORY_ROOT")
                .unwrap_or_else(|_| "./repositories".to_string())
                .into(),
            base_url: std::env::var("BASE_URL").unwrap_or_else(|_| "/api".to_string()),
            scan_concurrency,
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS", "30")?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            repository_root: PathBuf::from("./repositories"),
            base_url: "/api".to_string(),
            scan_concurrency: 4,
            request_timeout_seconds: 30,
        }
    }
}
