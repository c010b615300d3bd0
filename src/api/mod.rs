pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError, PendingDownload, Result};
pub use models::{ApiConfig, ConvertRequest, ErrorResponse};
