//! Content classifier and outlier filter.
//!
//! Given the elements extracted from one page, computes the tight
//! rectangle enclosing everything judged to be real content. Small,
//! isolated non-text elements (decorative corner marks, stray vector
//! artifacts) are excluded so they do not inflate the detected region;
//! text elements always contribute.

use crate::element::ContentElement;
use crate::geometry::Rect;

/// Elements covering more than this fraction of the page area are
/// background fills or watermarks, not content.
pub const PAGE_FILL_RATIO: f64 = 0.90;

/// An element is "tiny" when its area is below this fraction of the
/// current union area.
pub const TINY_AREA_RATIO: f64 = 0.01;

/// Merging a tiny element is "expansive" when it would grow the union
/// area by more than this fraction.
pub const EXPANSION_RATIO: f64 = 0.10;

/// Compute the accepted content bounds for one page.
///
/// Returns `None` when no element qualifies as content (empty page, or
/// only full-page background fills).
///
/// The algorithm is a greedy single-pass merge, not true clustering:
/// elements are sorted by area descending (stable, ties keep extraction
/// order, so results are deterministic), the union is seeded with the
/// largest element, and each remaining element is merged unless it is
/// both tiny relative to the current union and would disproportionately
/// expand it. Text elements are exempt from rejection regardless of
/// size or position.
pub fn detect_content_bounds(
    elements: &[ContentElement],
    page_width: f64,
    page_height: f64,
) -> Option<Rect> {
    let page_area = page_width * page_height;

    let mut candidates: Vec<&ContentElement> = elements
        .iter()
        .filter(|el| el.bbox.area() <= page_area * PAGE_FILL_RATIO)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    // Stable sort: equal areas keep their extraction order, which fixes
    // the greedy merge order and with it which elements get rejected.
    candidates.sort_by(|a, b| b.bbox.area().total_cmp(&a.bbox.area()));

    let mut union = candidates[0].bbox;

    for el in &candidates[1..] {
        let union_area = union.area();
        let merged = union.union(&el.bbox);
        let expansion = merged.area() - union_area;

        let is_tiny = el.bbox.area() < union_area * TINY_AREA_RATIO;
        let is_expansive = expansion > union_area * EXPANSION_RATIO;

        if is_tiny && is_expansive && !el.is_important() {
            continue;
        }

        union = merged;
    }

    Some(union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    const PAGE_W: f64 = 612.0;
    const PAGE_H: f64 = 792.0;

    fn text(x0: f64, y0: f64, x1: f64, y1: f64) -> ContentElement {
        ContentElement::new(Rect::new(x0, y0, x1, y1), ElementKind::Text)
    }

    fn path(x0: f64, y0: f64, x1: f64, y1: f64) -> ContentElement {
        ContentElement::new(Rect::new(x0, y0, x1, y1), ElementKind::Path)
    }

    fn image(x0: f64, y0: f64, x1: f64, y1: f64) -> ContentElement {
        ContentElement::new(Rect::new(x0, y0, x1, y1), ElementKind::Image)
    }

    #[test]
    fn empty_page_has_no_bounds() {
        assert_eq!(detect_content_bounds(&[], PAGE_W, PAGE_H), None);
    }

    #[test]
    fn single_element_is_its_own_bounds() {
        let els = [text(100.0, 100.0, 200.0, 200.0)];
        assert_eq!(
            detect_content_bounds(&els, PAGE_W, PAGE_H),
            Some(Rect::new(100.0, 100.0, 200.0, 200.0))
        );
    }

    #[test]
    fn background_fill_is_discarded() {
        // Covers > 90% of the page: background, not content.
        let els = [path(0.0, 0.0, PAGE_W, PAGE_H)];
        assert_eq!(detect_content_bounds(&els, PAGE_W, PAGE_H), None);
    }

    #[test]
    fn background_fill_discarded_but_real_content_kept() {
        let els = [
            path(0.0, 0.0, PAGE_W, PAGE_H),
            text(72.0, 500.0, 540.0, 720.0),
        ];
        assert_eq!(
            detect_content_bounds(&els, PAGE_W, PAGE_H),
            Some(Rect::new(72.0, 500.0, 540.0, 720.0))
        );
    }

    #[test]
    fn outlier_rejection_excludes_far_small_rect() {
        // Large text block (~80% of page area) plus a tiny vector mark
        // in the far corner: the mark must not expand the bounds.
        let block = text(40.0, 80.0, 572.0, 780.0);
        let mark = path(2.0, 2.0, 26.0, 26.0);
        let bounds = detect_content_bounds(&[block, mark], PAGE_W, PAGE_H).unwrap();
        assert_eq!(bounds, Rect::new(40.0, 80.0, 572.0, 780.0));
    }

    #[test]
    fn important_element_exception_includes_small_text() {
        // Same layout, but the small element is text: it must be merged.
        let block = text(40.0, 80.0, 572.0, 780.0);
        let label = text(2.0, 2.0, 26.0, 26.0);
        let bounds = detect_content_bounds(&[block, label], PAGE_W, PAGE_H).unwrap();
        assert_eq!(bounds, Rect::new(2.0, 2.0, 572.0, 780.0));
    }

    #[test]
    fn small_nearby_element_is_merged() {
        // Tiny but adjacent: expansion stays within 10% of the union, so
        // the heuristic keeps it.
        let block = path(100.0, 100.0, 500.0, 700.0);
        let nearby = image(100.0, 701.0, 120.0, 710.0);
        let bounds = detect_content_bounds(&[block, nearby], PAGE_W, PAGE_H).unwrap();
        assert_eq!(bounds, Rect::new(100.0, 100.0, 500.0, 710.0));
    }

    #[test]
    fn large_distant_element_is_merged() {
        // Far away but not tiny (>= 1% of the union area): kept.
        let block = path(300.0, 400.0, 500.0, 700.0);
        let sidebar = path(20.0, 100.0, 120.0, 300.0);
        let bounds = detect_content_bounds(&[block, sidebar], PAGE_W, PAGE_H).unwrap();
        assert_eq!(bounds, Rect::new(20.0, 100.0, 500.0, 700.0));
    }

    #[test]
    fn merge_order_is_deterministic_for_equal_areas() {
        // Two equal-area seeds: the stable sort keeps input order, so the
        // first one seeds the union either way the elements arrive.
        let a = path(0.0, 0.0, 100.0, 100.0);
        let b = path(200.0, 200.0, 300.0, 300.0);
        let first = detect_content_bounds(&[a, b], PAGE_W, PAGE_H);
        let second = detect_content_bounds(&[a, b], PAGE_W, PAGE_H);
        assert_eq!(first, second);
        // Neither is tiny relative to the other, so both merge.
        assert_eq!(first, Some(Rect::new(0.0, 0.0, 300.0, 300.0)));
    }

    #[test]
    fn tiny_outliers_rejected_in_area_order() {
        // Several corner marks around one dominant block: all rejected.
        let els = [
            path(2.0, 2.0, 14.0, 14.0),
            text(72.0, 72.0, 540.0, 720.0),
            path(598.0, 2.0, 610.0, 14.0),
            path(2.0, 778.0, 14.0, 790.0),
            path(598.0, 778.0, 610.0, 790.0),
        ];
        let bounds = detect_content_bounds(&els, PAGE_W, PAGE_H).unwrap();
        assert_eq!(bounds, Rect::new(72.0, 72.0, 540.0, 720.0));
    }

    #[test]
    fn all_background_and_no_content_is_none() {
        let els = [
            path(0.0, 0.0, PAGE_W, PAGE_H),
            image(-10.0, -10.0, PAGE_W + 10.0, PAGE_H + 10.0),
        ];
        assert_eq!(detect_content_bounds(&els, PAGE_W, PAGE_H), None);
    }
}
