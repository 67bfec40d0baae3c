//! Per-page bounds detection, parallel across pages.
//!
//! Detection is read-only, so pages can be analyzed concurrently over a
//! shared document. Results carry the page index so the caller can
//! apply crops sequentially in page order regardless of completion
//! order. A page whose detection fails or panics degrades to `None`
//! (left untrimmed) rather than failing the document.

use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::ObjectId;
use pdftrim_core::{detect_content_bounds, Rect};
use pdftrim_parse::{extract_elements, BackendError, PdfDocument};
use rayon::prelude::*;
use tracing::warn;

/// Below this page count the thread pool costs more than it saves.
const SEQUENTIAL_THRESHOLD: usize = 2;

/// Detection outcome for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Zero-based page index in document order.
    pub page_index: usize,
    /// Detected bounds in page space, `None` when the page is empty or
    /// detection failed.
    pub content_bounds: Option<Rect>,
}

/// Detect content bounds for every page of the document.
pub(crate) fn detect_pages(doc: &PdfDocument, max_threads: usize) -> Vec<PageResult> {
    let page_ids = doc.page_ids();
    if page_ids.len() <= SEQUENTIAL_THRESHOLD || max_threads <= 1 {
        return detect_sequential(doc, &page_ids);
    }

    let threads = max_threads.min(page_ids.len());
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| {
            page_ids
                .par_iter()
                .enumerate()
                .map(|(index, &id)| detect_one(doc, index, id))
                .collect()
        }),
        Err(e) => {
            warn!(error = %e, "thread pool unavailable, detecting sequentially");
            detect_sequential(doc, &page_ids)
        }
    }
}

fn detect_sequential(doc: &PdfDocument, page_ids: &[ObjectId]) -> Vec<PageResult> {
    page_ids
        .iter()
        .enumerate()
        .map(|(index, &id)| detect_one(doc, index, id))
        .collect()
}

fn detect_one(doc: &PdfDocument, page_index: usize, page_id: ObjectId) -> PageResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| page_bounds(doc, page_id)));
    let content_bounds = match outcome {
        Ok(Ok(bounds)) => bounds,
        Ok(Err(e)) => {
            warn!(page = page_index + 1, error = %e, "bounds detection failed, page left as-is");
            None
        }
        Err(_) => {
            warn!(page = page_index + 1, "bounds detection panicked, page left as-is");
            None
        }
    };
    PageResult {
        page_index,
        content_bounds,
    }
}

fn page_bounds(doc: &PdfDocument, page_id: ObjectId) -> Result<Option<Rect>, BackendError> {
    // The background threshold is always measured against the declared
    // media box. A previously applied crop box must not shrink the
    // reference area, or content just under the threshold would flip to
    // "background" on a repeated run and get cropped away.
    let media_box = doc.media_box(page_id)?;
    let elements = extract_elements(doc, page_id)?;
    Ok(detect_content_bounds(
        &elements,
        media_box.width(),
        media_box.height(),
    ))
}
