//! Error types for Excerpo operations.
//!
//! This module defines the main error type [`ExcerpoError`] which represents
//! all possible errors that can occur during URL handling, fetching, and
//! content extraction, plus the [`FailureKind`] taxonomy used to classify
//! failed batch results.
//!
//! # Example
//!
//! ```rust
//! use excerpo_core::{ExcerpoError, Result};
//!
//! fn extract_body(html: &str) -> Result<String> {
//!     if html.is_empty() {
//!         return Err(ExcerpoError::NoContent);
//!     }
//!     // ... extraction logic
//!     # Ok(String::new())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for extraction operations.
///
/// This enum represents all possible errors that can occur during
/// HTTP fetching, URL handling, cache I/O, and content extraction.
#[derive(Error, Debug)]
pub enum ExcerpoError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Redirect limit exceeded while following a URL.
    #[error("Too many redirects while fetching {0}")]
    TooManyRedirects(String),

    /// The server answered with a successful status and an empty body.
    #[error("Empty response body from {0}")]
    EmptyBody(String),

    /// HTML parsing errors.
    ///
    /// Returned when HTML cannot be parsed, often due to malformed markup
    /// or invalid CSS selectors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// No content could be extracted from the document.
    ///
    /// Returned when the document is empty or contains no suitable content
    /// candidates.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// The URL points at content this tool does not process.
    ///
    /// Images, video, audio, and archives are recorded for statistics but
    /// never fetched for text.
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    /// PDF text extraction is unavailable or produced too little text.
    #[error("PDF extraction failed: {0}")]
    PdfError(String),

    /// Invalid option combinations or values.
    ///
    /// Returned by option validation before any network work starts.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The batch was aborted by a failure with continue-on-error disabled.
    #[error("Batch aborted: {0}")]
    BatchFailed(String),
}

/// Classification of a failed per-URL result.
///
/// Every failed [`ExtractionResult`](crate::result::ExtractionResult) carries
/// exactly one of these so batch consumers can group failures without string
/// matching on error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The URL could not be normalized into a fetchable form.
    InvalidUrl,
    /// The normalized URL was already processed in this batch or session.
    Duplicate,
    /// The host matched an enabled exclusion list (e-commerce or adult).
    Excluded,
    /// The content category has no text to extract, or PDF support is off.
    UnsupportedContent,
    /// The network fetch failed or returned an empty body.
    FetchFailed,
    /// A PDF was fetched but no usable text layer was recovered.
    PdfExtractionFailed,
    /// The page fetched but no usable body text came out of it.
    ExtractionFailed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::InvalidUrl => "invalid URL",
            FailureKind::Duplicate => "duplicate URL",
            FailureKind::Excluded => "excluded host",
            FailureKind::UnsupportedContent => "unsupported content",
            FailureKind::FetchFailed => "fetch failed",
            FailureKind::PdfExtractionFailed => "PDF extraction failed",
            FailureKind::ExtractionFailed => "extraction failed",
        };
        f.write_str(label)
    }
}

impl ExcerpoError {
    /// Maps an error to the failure classification used in batch results.
    ///
    /// The match is exhaustive so new variants must pick a class.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ExcerpoError::UnsupportedContent(_) => FailureKind::UnsupportedContent,
            ExcerpoError::PdfError(_) => FailureKind::PdfExtractionFailed,
            ExcerpoError::HttpError(_)
            | ExcerpoError::Timeout { .. }
            | ExcerpoError::TooManyRedirects(_)
            | ExcerpoError::EmptyBody(_) => FailureKind::FetchFailed,
            ExcerpoError::HtmlParseError(_)
            | ExcerpoError::NoContent
            | ExcerpoError::ConfigError(_)
            | ExcerpoError::BatchFailed(_) => FailureKind::ExtractionFailed,
        }
    }
}

/// Result type alias for ExcerpoError.
///
/// This is a convenience alias for `std::result::Result<T, ExcerpoError>`.
pub type Result<T> = std::result::Result<T, ExcerpoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExcerpoError::EmptyBody("https://example.com/a".to_string());
        assert!(err.to_string().contains("Empty response body"));
    }

    #[test]
    fn test_timeout_error() {
        let err = ExcerpoError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_failure_kind_mapping() {
        let err = ExcerpoError::Timeout { timeout: 30 };
        assert_eq!(err.failure_kind(), FailureKind::FetchFailed);

        let err = ExcerpoError::EmptyBody("https://example.com/a".into());
        assert_eq!(err.failure_kind(), FailureKind::FetchFailed);

        let err = ExcerpoError::HtmlParseError("bad selector".into());
        assert_eq!(err.failure_kind(), FailureKind::ExtractionFailed);

        let err = ExcerpoError::NoContent;
        assert_eq!(err.failure_kind(), FailureKind::ExtractionFailed);
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::UnsupportedContent).unwrap();
        assert_eq!(json, "\"unsupported_content\"");
    }
}
