use thiserror::Error;

/// Why the validator refused an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Please enter a YouTube URL")]
    Missing,

    #[error("Please enter a valid YouTube URL")]
    Malformed,
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] UrlError),

    /// The backend refused the request; the message comes from its error
    /// body when it had one.
    #[error("{0}")]
    Backend(String),

    #[error("An unexpected error occurred. Please try again.")]
    Transport,

    #[error("Failed to save file: {0}")]
    Io(String),
}
