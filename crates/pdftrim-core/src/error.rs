//! Error types for whitespace trimming.
//!
//! [`TrimError`] covers document-level failures that abort processing of
//! one document. Page-level extraction failures are absorbed by the
//! scheduler (the page degrades to "no content") and never surface here.

use std::fmt;

/// Fatal error for one document.
#[derive(Debug, Clone, PartialEq)]
pub enum TrimError {
    /// The input path does not exist.
    DocumentNotFound(String),
    /// The document structure could not be parsed.
    DocumentParseError(String),
    /// I/O failure reading the input or writing the output.
    IoError(String),
    /// The requested margin is negative.
    InvalidMargin(f64),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for TrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimError::DocumentNotFound(path) => write!(f, "document not found: {path}"),
            TrimError::DocumentParseError(msg) => write!(f, "document parse error: {msg}"),
            TrimError::IoError(msg) => write!(f, "I/O error: {msg}"),
            TrimError::InvalidMargin(margin) => {
                write!(f, "margin must be >= 0, got {margin}")
            }
            TrimError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TrimError {}

impl From<std::io::Error> for TrimError {
    fn from(err: std::io::Error) -> Self {
        TrimError::IoError(err.to_string())
    }
}
