pub mod error;
pub mod model;

pub use error::{AppError, UrlError};
pub use model::{DownloadResult, MediaFormat, OperationPhase, RequestIntent, RetainedPayload};
