use serde::{Deserialize, Serialize};

use crate::domain::MediaFormat;

/// Body POSTed to the /download endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertRequest {
    pub url: String,
    pub format: MediaFormat,
}

/// Structured body the backend returns on a non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

const DEFAULT_BASE_URL: &str = "http://localhost:4000";
const BASE_URL_ENV: &str = "MEDIA_DOWNLOADER_API";

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Default configuration, with the base URL overridable through the
    /// `MEDIA_DOWNLOADER_API` environment variable.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self { base_url }
    }
}
