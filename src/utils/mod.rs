use std::sync::OnceLock;

use regex::Regex;

use crate::domain::UrlError;

/// Gate applied before any request is issued. Accepts youtube.com and
/// youtu.be links with or without a scheme or `www.` prefix, as long as
/// something follows the host.
pub fn validate_media_url(input: &str) -> Result<(), UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Missing);
    }
    if host_pattern().is_match(trimmed) {
        Ok(())
    } else {
        Err(UrlError::Malformed)
    }
}

fn host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+").expect("valid host pattern")
    })
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
