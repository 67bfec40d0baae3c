//! Whitespace trimming for PDF documents.
//!
//! Detects the content bounds of every page (text, images, painted
//! paths), rejects background artifacts and stray marks, then narrows
//! each page's `/CropBox` to the content plus a margin. Content streams
//! are never rewritten, so the result is lossless and reversible.
//!
//! ```no_run
//! let out = pdftrim::trim_whitespace("scan.pdf", 10.0, None)?;
//! println!("trimmed: {}", out.display());
//! # Ok::<(), pdftrim::TrimError>(())
//! ```

pub mod scheduler;
pub mod trimmer;

pub use scheduler::PageResult;
pub use trimmer::{trim_whitespace, Trimmer, DEFAULT_MARGIN};

pub use pdftrim_core::{
    compute_crop_box, detect_content_bounds, ContentElement, ElementKind, Rect, TrimError,
};
pub use pdftrim_parse::{extract_elements, PdfDocument};
