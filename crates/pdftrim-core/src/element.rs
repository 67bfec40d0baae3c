//! Content elements extracted from a page description.
//!
//! A [`ContentElement`] is the unit the classifier works on: one bounding
//! box per structural item, tagged with the kind of item it came from.
//! Elements are produced transiently per page and never persisted.

use crate::geometry::Rect;

/// The kind of structural item an element came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    /// A text run. Text is never rejected as an outlier, so headers,
    /// footers, and stray labels always contribute to the bounds.
    Text,
    /// A placed image (XObject or inline).
    Image,
    /// A painted vector path (lines, curves, rectangles).
    Path,
}

impl ElementKind {
    /// Returns `true` for kinds that must never be discarded by the
    /// outlier filter.
    pub fn is_important(&self) -> bool {
        matches!(self, ElementKind::Text)
    }
}

/// One visible item on a page: its bounding box and what produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentElement {
    /// Bounding box in page points (bottom-left origin).
    pub bbox: Rect,
    /// What kind of item produced this element.
    pub kind: ElementKind,
}

impl ContentElement {
    pub fn new(bbox: Rect, kind: ElementKind) -> Self {
        Self { bbox, kind }
    }

    /// Shorthand for `self.kind.is_important()`.
    pub fn is_important(&self) -> bool {
        self.kind.is_important()
    }
}
