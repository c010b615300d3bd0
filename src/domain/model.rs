use std::fmt;

use bytes::Bytes;
use serde::Serialize;

/// Output container requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp3,
    Mp4,
}

impl MediaFormat {
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What the user submitted: a source URL and the format to convert to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIntent {
    pub url: String,
    pub format: MediaFormat,
}

/// A fully buffered response body with its derived filename.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub payload: Bytes,
    pub filename: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Idle,
    Validating,
    InFlight,
    Success,
    Failed,
}

/// Downloaded bytes kept around briefly after a save so another copy can be
/// written without a second request. Released exactly once; the bytes are
/// gone afterwards.
#[derive(Debug)]
pub struct RetainedPayload {
    filename: String,
    payload: Option<Bytes>,
}

impl RetainedPayload {
    pub fn new(payload: Bytes, filename: String) -> Self {
        Self {
            filename,
            payload: Some(payload),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Drops the payload. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        self.payload.take().is_some()
    }

    pub fn is_released(&self) -> bool {
        self.payload.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_is_one_shot() {
        let mut retained = RetainedPayload::new(Bytes::from_static(b"abc"), "a.mp3".to_string());
        assert!(!retained.is_released());
        assert!(retained.release());
        assert!(retained.is_released());
        assert!(!retained.release());
    }

    #[test]
    fn test_bytes_gone_after_release() {
        let mut retained = RetainedPayload::new(Bytes::from_static(b"abc"), "a.mp3".to_string());
        assert_eq!(retained.bytes().map(|b| b.len()), Some(3));
        retained.release();
        assert!(retained.bytes().is_none());
        assert_eq!(retained.filename(), "a.mp3");
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(MediaFormat::Mp3.extension(), "mp3");
        assert_eq!(MediaFormat::Mp4.to_string(), "mp4");
    }
}
