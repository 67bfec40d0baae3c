//! PDF backend for whitespace trimming: document access on top of
//! `lopdf`, plus the content-stream interpreter that turns a page into
//! positioned [`pdftrim_core::ContentElement`]s.

pub mod document;
pub mod error;
pub mod font_metrics;
pub mod interpreter;

pub use document::PdfDocument;
pub use error::BackendError;
pub use font_metrics::FontMetrics;
pub use interpreter::extract_elements;
