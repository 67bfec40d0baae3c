//! Per-font width and vertical-extent metrics.
//!
//! Metrics are read from the font dictionary once per `Tf` and cached by
//! the interpreter. All values are in glyph space (thousandths of text
//! space); [`FontMetrics::glyph_width`] and the extent accessors return
//! those raw per-mille values, which the interpreter scales by the font
//! size.

use lopdf::Dictionary;

use crate::document::{as_f64, PdfDocument};

/// Fallback ascent when the font descriptor carries none.
pub const DEFAULT_ASCENT: f64 = 750.0;
/// Fallback descent when the font descriptor carries none.
pub const DEFAULT_DESCENT: f64 = -250.0;
/// Fallback advance width when no width entry covers a code.
pub const DEFAULT_WIDTH: f64 = 600.0;

/// Width and extent metrics for one font resource.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    first_char: u32,
    last_char: u32,
    widths: Vec<f64>,
    missing_width: f64,
    ascent: f64,
    descent: f64,
    /// One code unit uses two bytes (CID-keyed composite fonts).
    two_byte_codes: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            first_char: 0,
            last_char: 0,
            widths: Vec::new(),
            missing_width: DEFAULT_WIDTH,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            two_byte_codes: false,
        }
    }
}

impl FontMetrics {
    /// Build metrics from a `/Font` resource dictionary. Missing or
    /// malformed entries fall back to the defaults rather than failing:
    /// a page with an exotic font still gets usable, conservative
    /// bounds.
    pub fn from_dict(doc: &PdfDocument, font: &Dictionary) -> Self {
        let subtype = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");
        if subtype == b"Type0" {
            return Self::from_type0(doc, font);
        }

        let first_char = get_f64(doc, font, b"FirstChar").unwrap_or(0.0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .map(|obj| doc.resolve(obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| arr.iter().filter_map(as_f64).collect::<Vec<_>>())
            .unwrap_or_default();
        let last_char = if widths.is_empty() {
            0
        } else {
            first_char + widths.len() as u32 - 1
        };

        let descriptor = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|obj| doc.resolve_dict(obj));
        let (ascent, descent, missing_width) = descriptor_extents(doc, descriptor.as_ref());

        Self {
            first_char,
            last_char,
            widths,
            missing_width,
            ascent,
            descent,
            two_byte_codes: false,
        }
    }

    /// Composite fonts: widths come from the descendant's `/DW` default;
    /// the per-CID `/W` array is not consulted, which errs wide for CJK
    /// text and keeps bounds conservative.
    fn from_type0(doc: &PdfDocument, font: &Dictionary) -> Self {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .map(|obj| doc.resolve(obj))
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|obj| doc.resolve_dict(obj));

        let default_width = descendant
            .as_ref()
            .and_then(|d| get_f64(doc, d, b"DW"))
            .unwrap_or(1000.0);

        let descriptor = descendant
            .as_ref()
            .and_then(|d| d.get(b"FontDescriptor").ok())
            .and_then(|obj| doc.resolve_dict(obj));
        let (ascent, descent, _) = descriptor_extents(doc, descriptor.as_ref());

        Self {
            first_char: 0,
            last_char: 0,
            widths: Vec::new(),
            missing_width: default_width,
            ascent,
            descent,
            two_byte_codes: true,
        }
    }

    /// Advance width for a character code, in thousandths of text space.
    pub fn glyph_width(&self, code: u32) -> f64 {
        if code >= self.first_char && code <= self.last_char {
            let idx = (code - self.first_char) as usize;
            if let Some(w) = self.widths.get(idx) {
                return *w;
            }
        }
        self.missing_width
    }

    /// Ascent above the baseline, in thousandths of text space.
    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    /// Descent below the baseline (negative), in thousandths.
    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// Whether string bytes pair up into two-byte codes.
    pub fn two_byte_codes(&self) -> bool {
        self.two_byte_codes
    }

    /// Split a PDF string's bytes into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte_codes {
            bytes
                .chunks(2)
                .map(|pair| {
                    let hi = u32::from(pair[0]);
                    let lo = pair.get(1).copied().map(u32::from).unwrap_or(0);
                    (hi << 8) | lo
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }
}

fn descriptor_extents(doc: &PdfDocument, descriptor: Option<&Dictionary>) -> (f64, f64, f64) {
    let get = |key: &[u8], default: f64| {
        descriptor
            .and_then(|d| get_f64(doc, d, key))
            .unwrap_or(default)
    };
    let ascent = get(b"Ascent", DEFAULT_ASCENT);
    let descent = get(b"Descent", DEFAULT_DESCENT);
    let missing_width = get(b"MissingWidth", DEFAULT_WIDTH);
    // Some producers write 0 extents; those would collapse glyph boxes.
    let ascent = if ascent == 0.0 { DEFAULT_ASCENT } else { ascent };
    let descent = if descent == 0.0 { DEFAULT_DESCENT } else { descent };
    (ascent, descent, missing_width)
}

fn get_f64(doc: &PdfDocument, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    dict.get(key).ok().map(|obj| doc.resolve(obj)).and_then(as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};

    fn empty_doc() -> PdfDocument {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        PdfDocument::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn defaults_without_any_entries() {
        let doc = empty_doc();
        let metrics = FontMetrics::from_dict(&doc, &dictionary! {});
        assert_eq!(metrics.glyph_width(b'A' as u32), DEFAULT_WIDTH);
        assert_eq!(metrics.ascent(), DEFAULT_ASCENT);
        assert_eq!(metrics.descent(), DEFAULT_DESCENT);
        assert!(!metrics.two_byte_codes());
    }

    #[test]
    fn widths_array_indexed_from_first_char() {
        let doc = empty_doc();
        let font = dictionary! {
            "Subtype" => "TrueType",
            "FirstChar" => 65,
            "LastChar" => 67,
            "Widths" => vec![500.into(), 600.into(), 700.into()],
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.glyph_width(65), 500.0);
        assert_eq!(metrics.glyph_width(66), 600.0);
        assert_eq!(metrics.glyph_width(67), 700.0);
        // Outside the declared range falls back.
        assert_eq!(metrics.glyph_width(64), DEFAULT_WIDTH);
        assert_eq!(metrics.glyph_width(68), DEFAULT_WIDTH);
    }

    #[test]
    fn descriptor_extents_used_when_present() {
        let doc = empty_doc();
        let font = dictionary! {
            "Subtype" => "TrueType",
            "FontDescriptor" => dictionary! {
                "Ascent" => 820,
                "Descent" => -300,
                "MissingWidth" => 450,
            },
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.ascent(), 820.0);
        assert_eq!(metrics.descent(), -300.0);
        assert_eq!(metrics.glyph_width(10), 450.0);
    }

    #[test]
    fn zero_extents_replaced_by_defaults() {
        let doc = empty_doc();
        let font = dictionary! {
            "FontDescriptor" => dictionary! {
                "Ascent" => 0,
                "Descent" => 0,
            },
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.ascent(), DEFAULT_ASCENT);
        assert_eq!(metrics.descent(), DEFAULT_DESCENT);
    }

    #[test]
    fn type0_uses_default_width_and_two_byte_codes() {
        let doc = empty_doc();
        let font = dictionary! {
            "Subtype" => "Type0",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "DW" => 900,
            })],
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert!(metrics.two_byte_codes());
        assert_eq!(metrics.glyph_width(0x4E2D), 900.0);
        assert_eq!(metrics.codes(&[0x4E, 0x2D, 0x00, 0x41]), vec![0x4E2D, 0x41]);
    }

    #[test]
    fn type0_without_dw_defaults_to_1000() {
        let doc = empty_doc();
        let font = dictionary! { "Subtype" => "Type0" };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.glyph_width(1), 1000.0);
    }

    #[test]
    fn single_byte_codes_pass_through() {
        let metrics = FontMetrics::default();
        assert_eq!(metrics.codes(b"Hi"), vec![72, 105]);
    }
}
