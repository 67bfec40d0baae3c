//! Unified PDF document model.
//!
//! [`PdfDocument`] wraps one `lopdf::Document` and serves both sides of
//! the trimming pipeline: the read-only layout walk (content streams,
//! resources, page boxes) and the structural mutation (CropBox). Because
//! there is exactly one page list, the page counts seen by extraction
//! and by crop application cannot disagree.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdftrim_core::Rect;
use tracing::{debug, instrument};

use crate::error::BackendError;

/// A PDF document opened for bounds detection and cropping.
pub struct PdfDocument {
    doc: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<PathBuf>,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path_ref = path.as_ref();
        let doc = Document::load(path_ref)?;
        debug!(pages = doc.get_pages().len(), "PDF loaded");
        Ok(Self {
            doc,
            source_path: Some(path_ref.to_path_buf()),
        })
    }

    /// Open a PDF from raw bytes already in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackendError> {
        let doc = Document::load_mem(bytes)?;
        Ok(Self {
            doc,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object IDs in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages is keyed by 1-indexed page number; the BTreeMap
        // iterates in page order.
        self.doc.get_pages().into_values().collect()
    }

    /// Source path if the document was opened via [`PdfDocument::open`].
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// The page's media box, following `/Parent` inheritance.
    pub fn media_box(&self, page_id: ObjectId) -> Result<Rect, BackendError> {
        self.inherited_rect(page_id, b"MediaBox")
            .ok_or_else(|| BackendError::Parse(format!("page {page_id:?} has no MediaBox")))
    }

    /// The page's crop box, following `/Parent` inheritance. `None` when
    /// the page has no crop box (the media box is the visible region).
    pub fn crop_box(&self, page_id: ObjectId) -> Option<Rect> {
        self.inherited_rect(page_id, b"CropBox")
    }

    // -- Mutation -------------------------------------------------------------

    /// Set the page's `/CropBox`, narrowing the visible region. The
    /// content stream is untouched.
    pub fn set_crop_box(&mut self, page_id: ObjectId, rect: &Rect) -> Result<(), BackendError> {
        let page_dict = self
            .doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        page_dict.set(
            "CropBox",
            Object::Array(vec![
                Object::Real(rect.x0 as f32),
                Object::Real(rect.y0 as f32),
                Object::Real(rect.x1 as f32),
                Object::Real(rect.y1 as f32),
            ]),
        );
        Ok(())
    }

    // -- Serialization --------------------------------------------------------

    /// Write the document to a path.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        self.doc.save(path.as_ref())?;
        Ok(())
    }

    /// Write the document to any writer.
    pub fn save_to<W: std::io::Write>(&mut self, target: &mut W) -> Result<(), BackendError> {
        self.doc.save_to(target)?;
        Ok(())
    }

    // -- Layout-walk support --------------------------------------------------

    /// The page's decompressed content stream bytes, concatenated in
    /// declaration order.
    pub fn content_bytes(&self, page_id: ObjectId) -> Result<Vec<u8>, BackendError> {
        let page_dict = self.doc.get_object(page_id).and_then(Object::as_dict)?;
        let mut out = Vec::new();
        if let Ok(contents) = page_dict.get(b"Contents") {
            for stream in self.content_streams(contents)? {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                out.extend_from_slice(&data);
                out.push(b'\n');
            }
        }
        Ok(out)
    }

    /// The page's effective `/Resources` dictionary, following `/Parent`
    /// inheritance. `None` when neither the page nor any ancestor
    /// declares resources.
    pub fn resources(&self, page_id: ObjectId) -> Option<Dictionary> {
        let mut dict = self.doc.get_object(page_id).ok()?.as_dict().ok()?;
        loop {
            if let Ok(obj) = dict.get(b"Resources") {
                return self.resolve_dict(obj);
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => {
                    dict = self.doc.get_object(*parent_id).ok()?.as_dict().ok()?;
                }
                _ => return None,
            }
        }
    }

    /// Resolve an object that may be a direct dictionary or a reference
    /// to one.
    pub(crate) fn resolve_dict(&self, obj: &Object) -> Option<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .cloned(),
            _ => None,
        }
    }

    /// Resolve a reference one level; direct objects pass through.
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn content_streams(&self, contents: &Object) -> Result<Vec<lopdf::Stream>, BackendError> {
        let mut streams = Vec::new();
        match self.resolve(contents) {
            Object::Stream(s) => streams.push(s.clone()),
            Object::Array(arr) => {
                for entry in arr {
                    if let Object::Stream(s) = self.resolve(entry) {
                        streams.push(s.clone());
                    }
                }
            }
            _ => {}
        }
        Ok(streams)
    }

    /// Look up a rectangle-valued key on the page, walking the `/Parent`
    /// chain for inheritable attributes.
    fn inherited_rect(&self, page_id: ObjectId, key: &[u8]) -> Option<Rect> {
        let mut dict = self.doc.get_object(page_id).ok()?.as_dict().ok()?;
        loop {
            if let Ok(obj) = dict.get(key) {
                if let Object::Array(arr) = self.resolve(obj) {
                    if let Some(rect) = rect_from_array(arr) {
                        return Some(rect);
                    }
                }
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => {
                    dict = self.doc.get_object(*parent_id).ok()?.as_dict().ok()?;
                }
                _ => return None,
            }
        }
    }
}

/// Numeric value of an integer or real object.
pub(crate) fn as_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// A `[llx lly urx ury]` array as a normalized [`Rect`].
pub(crate) fn rect_from_array(arr: &[Object]) -> Option<Rect> {
    if arr.len() != 4 {
        return None;
    }
    Some(Rect::new(
        as_f64(&arr[0])?,
        as_f64(&arr[1])?,
        as_f64(&arr[2])?,
        as_f64(&arr[3])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Two-page document: MediaBox inherited from the /Pages node,
    /// one content stream per page.
    fn two_page_doc() -> PdfDocument {
        let mut doc = Document::with_version("1.5");

        let content_a = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            b"0 0 100 100 re f".to_vec(),
        ));
        let content_b = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            b"50 50 200 200 re f".to_vec(),
        ));

        let page_a = doc.add_object(dictionary! {
            "Type" => "Page",
            "Contents" => Object::Reference(content_a),
        });
        let page_b = doc.add_object(dictionary! {
            "Type" => "Page",
            "Contents" => Object::Reference(content_b),
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_a), Object::Reference(page_b)],
            "Count" => 2,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        for id in [page_a, page_b] {
            doc.get_object_mut(id)
                .unwrap()
                .as_dict_mut()
                .unwrap()
                .set("Parent", Object::Reference(pages_id));
        }

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
    fn page_ids_in_order() {
        let doc = two_page_doc();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_ids().len(), 2);
    }

    #[test]
    fn media_box_inherited_from_pages_node() {
        let doc = two_page_doc();
        for page_id in doc.page_ids() {
            let mb = doc.media_box(page_id).unwrap();
            assert_eq!(mb, Rect::new(0.0, 0.0, 612.0, 792.0));
        }
    }

    #[test]
    fn crop_box_absent_by_default() {
        let doc = two_page_doc();
        let page_id = doc.page_ids()[0];
        assert_eq!(doc.crop_box(page_id), None);
    }

    #[test]
    fn set_crop_box_roundtrip() {
        let mut doc = two_page_doc();
        let page_id = doc.page_ids()[0];
        let rect = Rect::new(90.0, 90.0, 210.0, 210.0);
        doc.set_crop_box(page_id, &rect).unwrap();

        let read_back = doc.crop_box(page_id).unwrap();
        assert!(read_back.approx_eq(&rect, 0.01));

        // The other page is untouched.
        assert_eq!(doc.crop_box(doc.page_ids()[1]), None);
    }

    #[test]
    fn content_bytes_concatenated() {
        let doc = two_page_doc();
        let bytes = doc.content_bytes(doc.page_ids()[0]).unwrap();
        assert_eq!(bytes, b"0 0 100 100 re f\n");
    }

    #[test]
    fn set_crop_box_survives_save() {
        let mut doc = two_page_doc();
        let page_id = doc.page_ids()[0];
        doc.set_crop_box(page_id, &Rect::new(10.0, 10.0, 300.0, 400.0))
            .unwrap();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let reloaded = PdfDocument::from_bytes(&bytes).unwrap();
        let cb = reloaded.crop_box(reloaded.page_ids()[0]).unwrap();
        assert!(cb.approx_eq(&Rect::new(10.0, 10.0, 300.0, 400.0), 0.01));
    }

    #[test]
    fn invalid_bytes_fail_to_parse() {
        assert!(PdfDocument::from_bytes(b"not a pdf").is_err());
    }

    #[test]
    fn rect_from_array_rejects_short_arrays() {
        assert!(rect_from_array(&[0.into(), 0.into()]).is_none());
    }

    #[test]
    fn as_f64_reads_integers_and_reals() {
        assert_eq!(as_f64(&Object::Integer(42)), Some(42.0));
        assert_eq!(as_f64(&Object::Real(1.5)), Some(1.5));
        assert_eq!(as_f64(&Object::Null), None);
    }
}
