//! Target URL validation.

use url::Url;

/// Errors that can occur while validating a target URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks that `input` is an absolute HTTP(S) URL with a host.
///
/// Returns the trimmed input unchanged, so a later lookup returns exactly
/// what was submitted.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for relative or malformed URLs.
/// Returns [`UrlValidationError::UnsupportedProtocol`] for schemes such as
/// `javascript:`, `data:` or `file:`.
pub fn validate_long_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(trimmed.to_string())
}
