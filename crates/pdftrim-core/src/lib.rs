//! pdftrim-core: Backend-independent types and algorithms for pdftrim.
//!
//! This crate provides the geometry primitives ([`Rect`], [`Matrix`]),
//! the content-element model, the content classifier / outlier filter
//! ([`detect_content_bounds`]), the crop-box computation
//! ([`compute_crop_box`]), and the error taxonomy ([`TrimError`]).
//! It knows nothing about the PDF file format and performs no I/O.

pub mod bounds;
pub mod crop;
pub mod element;
pub mod error;
pub mod geometry;

pub use bounds::{EXPANSION_RATIO, PAGE_FILL_RATIO, TINY_AREA_RATIO, detect_content_bounds};
pub use crop::{CROP_EPSILON, CROP_SKIP_RATIO, compute_crop_box};
pub use element::{ContentElement, ElementKind};
pub use error::TrimError;
pub use geometry::{Matrix, Rect};
