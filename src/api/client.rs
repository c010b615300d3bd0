use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response};
use thiserror::Error;
use url::Url;

use super::models::{ApiConfig, ConvertRequest, ErrorResponse};
use crate::domain::{DownloadResult, MediaFormat};

const FILENAME_HEADER: &str = "x-filename";
const FALLBACK_BASENAME: &str = "download";
const REJECTION_FALLBACK: &str = "Download failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status; carries the backend's message or a fallback.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid backend address: {0}")]
    BadBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> Result<Url> {
        let base =
            Url::parse(&self.config.base_url).map_err(|e| ApiError::BadBaseUrl(e.to_string()))?;
        base.join("download")
            .map_err(|e| ApiError::BadBaseUrl(e.to_string()))
    }

    /// Sends the conversion request. A success response comes back as a
    /// [`PendingDownload`] with its filename already derived; rejection and
    /// transport problems are errors.
    pub async fn request_conversion(&self, request: &ConvertRequest) -> Result<PendingDownload> {
        let endpoint = self.endpoint()?;
        tracing::debug!(%endpoint, format = %request.format, "requesting conversion");

        let response = self.http.post(endpoint).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = rejection_message(response).await;
            tracing::debug!(%status, reason = %message, "backend rejected request");
            return Err(ApiError::Rejected(message));
        }

        let filename = derive_filename(response.headers(), request.format);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(PendingDownload {
            filename,
            content_type,
            response,
        })
    }
}

/// A success response whose body has not been read yet.
pub struct PendingDownload {
    pub filename: String,
    pub content_type: Option<String>,
    response: Response,
}

impl PendingDownload {
    /// Buffers the whole payload. Only a fully read body is ever handed on.
    pub async fn into_payload(self) -> Result<DownloadResult> {
        let payload: Bytes = self.response.bytes().await?;
        Ok(DownloadResult {
            payload,
            filename: self.filename,
            content_type: self.content_type,
        })
    }
}

/// Best-effort extraction of the backend's error message.
async fn rejection_message(response: Response) -> String {
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(_) => return REJECTION_FALLBACK.to_string(),
    };
    match serde_json::from_slice::<ErrorResponse>(&body) {
        Ok(ErrorResponse {
            error: Some(message),
        }) if !message.is_empty() => message,
        _ => REJECTION_FALLBACK.to_string(),
    }
}

/// Filename precedence: dedicated header, then Content-Disposition, then a
/// per-format default. Never fails; a garbled header just falls through.
fn derive_filename(headers: &HeaderMap, format: MediaFormat) -> String {
    if let Some(name) = headers
        .get(FILENAME_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    if let Some(name) = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(disposition_filename)
    {
        return name;
    }

    format!("{}.{}", FALLBACK_BASENAME, format.extension())
}

/// Pulls the `filename=` token out of a Content-Disposition value. Quoted
/// and unquoted forms are both accepted; `filename*=` is not.
fn disposition_filename(value: &str) -> Option<String> {
    for part in value.split(';') {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("filename") {
            continue;
        }
        let name = raw.trim().trim_matches('"');
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    None
}
