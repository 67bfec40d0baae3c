//! Crop-box computation.
//!
//! Turns detected content bounds into a new visible-region box: bounds
//! plus margin, clamped to the page box, skipped when the result would
//! not meaningfully shrink the page or would not change the current box.

use crate::geometry::Rect;

/// A crop is skipped when the new box keeps at least this fraction of
/// the page box in *both* dimensions (content already fills the page).
pub const CROP_SKIP_RATIO: f64 = 0.95;

/// Tolerance when comparing the computed box against the current crop
/// box; boxes closer than this are the same box.
pub const CROP_EPSILON: f64 = 0.01;

/// Compute the new visible-region box for one page.
///
/// * `page_box` — the page's boundary rectangle (media box); the hard
///   outer limit the result is clamped to.
/// * `current_box` — the page's current effective crop box (existing
///   crop box, else the page box). A computed box equal to it within
///   [`CROP_EPSILON`] is a no-op.
/// * `bounds` — detected content bounds, or `None` when the page had no
///   qualifying content.
/// * `margin` — padding in points added around the bounds.
///
/// Returns `Some(new_box)` when the page's box should change, `None`
/// for a no-op. The crop is applied if *either* dimension would shrink
/// below [`CROP_SKIP_RATIO`] of the page box.
pub fn compute_crop_box(
    page_box: &Rect,
    current_box: &Rect,
    bounds: Option<&Rect>,
    margin: f64,
) -> Option<Rect> {
    let bounds = bounds?;

    // Margin padding, clamped so the box never exceeds the page boundary.
    let new_box = Rect {
        x0: (bounds.x0 - margin).max(page_box.x0),
        y0: (bounds.y0 - margin).max(page_box.y0),
        x1: (bounds.x1 + margin).min(page_box.x1),
        y1: (bounds.y1 + margin).min(page_box.y1),
    };

    // Content fills most of the page: a crop this small is not worth a
    // potentially lossy box change.
    if new_box.width() >= page_box.width() * CROP_SKIP_RATIO
        && new_box.height() >= page_box.height() * CROP_SKIP_RATIO
    {
        return None;
    }

    // Unchanged box: repeated runs are fixed points.
    if new_box.approx_eq(current_box, CROP_EPSILON) {
        return None;
    }

    Some(new_box)
}
