//! Geometry primitives: axis-aligned rectangles and affine transforms.
//!
//! Coordinates are PDF-native page points with a bottom-left origin:
//! - `x0`: left edge
//! - `y0`: bottom edge
//! - `x1`: right edge
//! - `y1`: top edge

/// Axis-aligned rectangle in page points (bottom-left origin).
///
/// Invariant: `x0 <= x1` and `y0 <= y1`. [`Rect::new`] normalizes
/// swapped corners so the invariant holds for any input.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from two corner points, normalizing so that
    /// `(x0, y0)` is the lower-left and `(x1, y1)` the upper-right corner.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Minimal rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Returns `true` if the two rectangles share any area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Returns `true` if `other` lies entirely within `self` (edges included).
    pub fn contains(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Returns `true` if every edge is within `epsilon` of the
    /// corresponding edge of `other`.
    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        (self.x0 - other.x0).abs() <= epsilon
            && (self.y0 - other.y0).abs() <= epsilon
            && (self.x1 - other.x1).abs() <= epsilon
            && (self.y1 - other.y1).abs() <= epsilon
    }
}

/// Affine transformation matrix `[a b c d e f]` as used by the PDF
/// graphics model.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// A pure translation by `(tx, ty)`.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Matrix product `self × other`.
    ///
    /// Follows the PDF convention for the `cm` operator: the new matrix
    /// is pre-multiplied, so `CTM' = new.concat(&ctm)`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point through this matrix.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Axis-aligned hull of a rectangle transformed through this matrix.
    ///
    /// All four corners are transformed and re-normalized, since rotation
    /// or negative scaling may swap min/max.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let (ax, ay) = self.transform_point(rect.x0, rect.y0);
        let (bx, by) = self.transform_point(rect.x1, rect.y0);
        let (cx, cy) = self.transform_point(rect.x0, rect.y1);
        let (dx, dy) = self.transform_point(rect.x1, rect.y1);
        Rect {
            x0: ax.min(bx).min(cx).min(dx),
            y0: ay.min(by).min(cy).min(dy),
            x1: ax.max(bx).max(cx).max(dx),
            y1: ay.max(by).max(cy).max(dy),
        }
    }
}
