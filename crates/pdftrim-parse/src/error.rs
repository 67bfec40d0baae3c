//! Error types for the document model and layout extractor.
//!
//! Uses [`thiserror`] for ergonomic error derivation. [`BackendError`]
//! wraps lopdf and interpreter failures and converts to
//! [`TrimError`] for unified handling at the engine level.

use pdftrim_core::TrimError;
use thiserror::Error;

/// Error type for PDF backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for TrimError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => TrimError::DocumentParseError(msg),
            BackendError::Io(e) => TrimError::IoError(e.to_string()),
            BackendError::Font(msg) | BackendError::Interpreter(msg) => TrimError::Other(msg),
        }
    }
}
