//! Error types for Gleaner operations.
//!
//! This module defines the main error type [`GleanerError`] which represents
//! every failure that can occur while fetching a page, extracting content,
//! persisting rows or analyzing a persisted file.
//!
//! Variants are grouped by [`ErrorKind`] so that outer surfaces (the HTTP
//! server, the CLI) can choose a status without matching every variant.
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::{GleanerError, Result};
//!
//! fn require_url(url: Option<&str>) -> Result<&str> {
//!     url.ok_or(GleanerError::MissingField("url"))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fetch, extraction, persistence and analysis.
#[derive(Error, Debug)]
pub enum GleanerError {
    /// A required request field was absent or blank.
    #[error("'{0}' is required")]
    MissingField(&'static str),

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed even after defaulting the scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector syntax.
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A file name that could escape the output directory.
    #[error("Invalid file name: {0}")]
    InvalidFilename(String),

    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps DNS failures, refused connections, TLS problems
    /// and other transport-level errors.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request to '{url}' timed out after {timeout} seconds")]
    Timeout { url: String, timeout: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP error {status} while fetching '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// No content could be extracted from the document.
    #[error("No extractable information found")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A persisted file holds no header or no data rows.
    #[error("File '{0}' is empty or is not a valid CSV table")]
    EmptyTable(String),

    /// A persisted file lacks a column the analysis needs.
    #[error("File '{filename}' has no '{column}' column")]
    MissingColumn { filename: String, column: String },

    /// Analysis kind other than the supported ones.
    #[error("Unsupported analysis type: {0}")]
    UnsupportedAnalysis(String),

    /// CSV reader or writer errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of [`GleanerError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    Parse,
    Schema,
    NotFound,
    Unsupported,
    Extraction,
    Unknown,
}

impl GleanerError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) | Self::InvalidUrl(_) | Self::InvalidSelector { .. } | Self::InvalidFilename(_) => {
                ErrorKind::Validation
            }
            Self::Http(_) | Self::Timeout { .. } | Self::HttpStatus { .. } => ErrorKind::Network,
            Self::EmptyTable(_) | Self::Csv(_) => ErrorKind::Parse,
            Self::MissingColumn { .. } => ErrorKind::Schema,
            Self::FileNotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedAnalysis(_) => ErrorKind::Unsupported,
            Self::NoContent => ErrorKind::Extraction,
            Self::Io(_) | Self::Json(_) => ErrorKind::Unknown,
        }
    }
}

/// Result type alias for GleanerError.
pub type Result<T> = std::result::Result<T, GleanerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GleanerError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = GleanerError::Timeout { url: "http://example.com".to_string(), timeout: 10 };
        assert!(err.to_string().contains("10 seconds"));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_missing_field_is_validation() {
        let err = GleanerError::MissingField("url");
        assert_eq!(err.to_string(), "'url' is required");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(GleanerError::FileNotFound(PathBuf::from("a.csv")).kind(), ErrorKind::NotFound);
        assert_eq!(GleanerError::EmptyTable("a.csv".into()).kind(), ErrorKind::Parse);
        assert_eq!(
            GleanerError::MissingColumn { filename: "a.csv".into(), column: "text".into() }.kind(),
            ErrorKind::Schema
        );
        assert_eq!(GleanerError::UnsupportedAnalysis("pie".into()).kind(), ErrorKind::Unsupported);
        assert_eq!(GleanerError::NoContent.kind(), ErrorKind::Extraction);
    }
}
