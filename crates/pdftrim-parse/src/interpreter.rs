//! Content-stream interpreter.
//!
//! Walks a page's operator stream and emits one [`ContentElement`] per
//! visible item: a union box per text show, a hull per painted path, a
//! CTM-mapped unit square per image. Only geometry is tracked; colors,
//! clipping and rendering intents are ignored because bounds detection
//! needs positions, not pixels.
//!
//! Coordinates stay in PDF user space (bottom-left origin), the same
//! space `/CropBox` is written in.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};
use pdftrim_core::{ContentElement, ElementKind, Matrix, Rect};
use tracing::{debug, trace, warn};

use crate::document::{as_f64, PdfDocument};
use crate::error::BackendError;
use crate::font_metrics::FontMetrics;

/// Nested Form XObjects beyond this depth are skipped. Real documents
/// rarely nest past three or four; a cycle would otherwise recurse
/// forever.
const MAX_FORM_DEPTH: usize = 8;

/// Extract the positioned elements of one page.
pub fn extract_elements(
    doc: &PdfDocument,
    page_id: ObjectId,
) -> Result<Vec<ContentElement>, BackendError> {
    let content = doc.content_bytes(page_id)?;
    let resources = doc.resources(page_id).unwrap_or_default();

    let mut interp = Interpreter::new(doc);
    interp.run(&content, &resources, Matrix::identity(), 0)?;
    debug!(
        page = ?page_id,
        elements = interp.elements.len(),
        "page content interpreted"
    );
    Ok(interp.elements)
}

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Rc<FontMetrics>>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    /// Horizontal scaling as a fraction (`Tz` operand / 100).
    horiz_scale: f64,
    leading: f64,
    rise: f64,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horiz_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
        }
    }
}

struct Interpreter<'a> {
    doc: &'a PdfDocument,
    elements: Vec<ContentElement>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text: TextState,
    /// Device-space points of the path being built, consumed by the
    /// next paint operator.
    path_points: Vec<(f64, f64)>,
    font_cache: HashMap<Vec<u8>, Rc<FontMetrics>>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a PdfDocument) -> Self {
        Self {
            doc,
            elements: Vec::new(),
            ctm: Matrix::identity(),
            ctm_stack: Vec::new(),
            text: TextState::default(),
            path_points: Vec::new(),
            font_cache: HashMap::new(),
        }
    }

    fn run(
        &mut self,
        content: &[u8],
        resources: &Dictionary,
        base_ctm: Matrix,
        depth: usize,
    ) -> Result<(), BackendError> {
        let parsed = Content::decode(content)
            .map_err(|e| BackendError::Interpreter(format!("content stream decode: {e}")))?;

        self.ctm = base_ctm;
        for op in &parsed.operations {
            let args = &op.operands;
            match op.operator.as_str() {
                // -- Graphics state ------------------------------------------
                "q" => self.ctm_stack.push(self.ctm),
                "Q" => {
                    if let Some(prev) = self.ctm_stack.pop() {
                        self.ctm = prev;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from_args(args) {
                        self.ctm = m.concat(&self.ctm);
                    }
                }

                // -- Text object and state ------------------------------------
                "BT" => {
                    self.text.text_matrix = Matrix::identity();
                    self.text.line_matrix = Matrix::identity();
                }
                "ET" => {}
                "Tf" => {
                    if let (Some(Object::Name(name)), Some(size)) =
                        (args.first(), args.get(1).and_then(as_f64))
                    {
                        self.text.font = Some(self.load_font(name, resources));
                        self.text.size = size;
                    }
                }
                "Tc" => {
                    if let Some(v) = args.first().and_then(as_f64) {
                        self.text.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = args.first().and_then(as_f64) {
                        self.text.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = args.first().and_then(as_f64) {
                        self.text.horiz_scale = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(v) = args.first().and_then(as_f64) {
                        self.text.leading = v;
                    }
                }
                "Ts" => {
                    if let Some(v) = args.first().and_then(as_f64) {
                        self.text.rise = v;
                    }
                }
                "Td" => {
                    if let (Some(tx), Some(ty)) =
                        (args.first().and_then(as_f64), args.get(1).and_then(as_f64))
                    {
                        self.next_line(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) =
                        (args.first().and_then(as_f64), args.get(1).and_then(as_f64))
                    {
                        self.text.leading = -ty;
                        self.next_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from_args(args) {
                        self.text.line_matrix = m;
                        self.text.text_matrix = m;
                    }
                }
                "T*" => self.next_line(0.0, -self.text.leading),

                // -- Text showing ---------------------------------------------
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = args.first() {
                        self.show_text(bytes);
                    }
                }
                "'" => {
                    self.next_line(0.0, -self.text.leading);
                    if let Some(Object::String(bytes, _)) = args.first() {
                        self.show_text(bytes);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) =
                        (args.first().and_then(as_f64), args.get(1).and_then(as_f64))
                    {
                        self.text.word_spacing = aw;
                        self.text.char_spacing = ac;
                    }
                    self.next_line(0.0, -self.text.leading);
                    if let Some(Object::String(bytes, _)) = args.get(2) {
                        self.show_text(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = args.first() {
                        for part in parts {
                            match part {
                                Object::String(bytes, _) => self.show_text(bytes),
                                other => {
                                    if let Some(adjust) = as_f64(other) {
                                        self.adjust_text_position(adjust);
                                    }
                                }
                            }
                        }
                    }
                }

                // -- Path construction ----------------------------------------
                "m" => {
                    if let Some(p) = point_from_args(args, 0) {
                        self.move_to(p);
                    }
                }
                "l" => {
                    if let Some(p) = point_from_args(args, 0) {
                        self.line_to(p);
                    }
                }
                "c" => {
                    // Control points bound the curve, so the hull of all
                    // three points covers it.
                    for i in 0..3 {
                        if let Some(p) = point_from_args(args, i * 2) {
                            self.line_to(p);
                        }
                    }
                }
                "v" | "y" => {
                    for i in 0..2 {
                        if let Some(p) = point_from_args(args, i * 2) {
                            self.line_to(p);
                        }
                    }
                }
                "re" => {
                    if let (Some(x), Some(y), Some(w), Some(h)) = (
                        args.first().and_then(as_f64),
                        args.get(1).and_then(as_f64),
                        args.get(2).and_then(as_f64),
                        args.get(3).and_then(as_f64),
                    ) {
                        self.move_to((x, y));
                        self.line_to((x + w, y));
                        self.line_to((x + w, y + h));
                        self.line_to((x, y + h));
                    }
                }
                "h" => {}

                // -- Path painting --------------------------------------------
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => self.paint_path(),
                "n" => self.clear_path(),
                // Clipping does not shrink painted geometry reliably
                // enough to narrow bounds by, so W/W* only terminate
                // path construction together with the following paint
                // operator.
                "W" | "W*" => {}

                // -- XObjects and inline images -------------------------------
                "Do" => {
                    if let Some(Object::Name(name)) = args.first() {
                        self.invoke_xobject(name, resources, depth);
                    }
                }
                // Inline images paint the CTM unit square like Do on an
                // /Image.
                "BI" => {
                    let bbox = self.ctm.transform_rect(&Rect::new(0.0, 0.0, 1.0, 1.0));
                    self.elements
                        .push(ContentElement::new(bbox, ElementKind::Image));
                }
                "ID" | "EI" => {}

                other => trace!(operator = other, "operator ignored"),
            }
        }
        Ok(())
    }

    // -- Text -----------------------------------------------------------------

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.text.line_matrix = Matrix::translate(tx, ty).concat(&self.text.line_matrix);
        self.text.text_matrix = self.text.line_matrix;
    }

    /// Shift the text matrix by a `TJ` adjustment (thousandths of text
    /// space, positive moves left).
    fn adjust_text_position(&mut self, adjust: f64) {
        let tx = -adjust / 1000.0 * self.text.size * self.text.horiz_scale;
        self.text.text_matrix = Matrix::translate(tx, 0.0).concat(&self.text.text_matrix);
    }

    fn show_text(&mut self, bytes: &[u8]) {
        let Some(font) = self.text.font.clone() else {
            return;
        };
        if self.text.size == 0.0 || bytes.is_empty() {
            return;
        }

        let size = self.text.size;
        let th = self.text.horiz_scale;
        let ascent = font.ascent() / 1000.0;
        let descent = font.descent() / 1000.0;

        let mut union: Option<Rect> = None;
        for code in font.codes(bytes) {
            let w0 = font.glyph_width(code) / 1000.0;
            // Word spacing applies to byte 32 only; tabs and line
            // endings inside a string are still inkless.
            let is_space = code == 32 && !font.two_byte_codes();
            let is_whitespace =
                !font.two_byte_codes() && matches!(code, 9 | 10 | 12 | 13 | 32);

            // Whitespace advances the pen but carries no ink, so it
            // never widens the box; a run of pure whitespace yields no
            // element at all.
            if !is_whitespace {
                // Glyph box in unscaled text space; the render matrix
                // applies size, horizontal scaling and rise.
                let trm = Matrix::new(size * th, 0.0, 0.0, size, 0.0, self.text.rise)
                    .concat(&self.text.text_matrix)
                    .concat(&self.ctm);
                let device = trm.transform_rect(&Rect::new(0.0, descent, w0, ascent));
                union = Some(match union {
                    Some(u) => u.union(&device),
                    None => device,
                });
            }

            let mut advance = w0 * size + self.text.char_spacing;
            if is_space {
                advance += self.text.word_spacing;
            }
            self.text.text_matrix =
                Matrix::translate(advance * th, 0.0).concat(&self.text.text_matrix);
        }

        if let Some(bbox) = union {
            self.elements
                .push(ContentElement::new(bbox, ElementKind::Text));
        }
    }

    fn load_font(&mut self, name: &[u8], resources: &Dictionary) -> Rc<FontMetrics> {
        if let Some(cached) = self.font_cache.get(name) {
            return Rc::clone(cached);
        }
        let font_dict = resources
            .get(b"Font")
            .ok()
            .and_then(|obj| self.doc.resolve_dict(obj))
            .and_then(|fonts| fonts.get(name).ok().and_then(|o| self.doc.resolve_dict(o)));
        let metrics = match font_dict {
            Some(font) => FontMetrics::from_dict(self.doc, &font),
            None => {
                warn!(
                    font = %String::from_utf8_lossy(name),
                    "font resource not found, using fallback metrics"
                );
                FontMetrics::default()
            }
        };
        let metrics = Rc::new(metrics);
        self.font_cache.insert(name.to_vec(), Rc::clone(&metrics));
        metrics
    }

    // -- Paths ----------------------------------------------------------------

    fn move_to(&mut self, p: (f64, f64)) {
        self.path_points.push(self.ctm.transform_point(p.0, p.1));
    }

    fn line_to(&mut self, p: (f64, f64)) {
        self.path_points.push(self.ctm.transform_point(p.0, p.1));
    }

    fn paint_path(&mut self) {
        if self.path_points.len() >= 2 {
            let (mut x0, mut y0) = self.path_points[0];
            let (mut x1, mut y1) = self.path_points[0];
            for &(x, y) in &self.path_points[1..] {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
            self.elements.push(ContentElement::new(
                Rect::new(x0, y0, x1, y1),
                ElementKind::Path,
            ));
        }
        self.clear_path();
    }

    fn clear_path(&mut self) {
        self.path_points.clear();
    }

    // -- XObjects -------------------------------------------------------------

    fn invoke_xobject(&mut self, name: &[u8], resources: &Dictionary, depth: usize) {
        let Some(xobject) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| self.doc.resolve_dict(obj))
            .and_then(|xobjects| xobjects.get(name).ok().map(|o| self.doc.resolve(o).clone()))
        else {
            return;
        };
        let Object::Stream(stream) = xobject else {
            return;
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");

        match subtype {
            b"Image" => {
                // Images are placed by mapping the unit square through
                // the CTM.
                let bbox = self.ctm.transform_rect(&Rect::new(0.0, 0.0, 1.0, 1.0));
                self.elements
                    .push(ContentElement::new(bbox, ElementKind::Image));
            }
            b"Form" => {
                if depth >= MAX_FORM_DEPTH {
                    debug!(depth, "form nesting limit reached, skipping");
                    return;
                }
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| o.as_array().ok())
                    .and_then(|arr| matrix_from_args(arr))
                    .unwrap_or_else(Matrix::identity);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| self.doc.resolve_dict(obj))
                    .unwrap_or_else(|| resources.clone());
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());

                let saved_ctm = self.ctm;
                let saved_stack_len = self.ctm_stack.len();
                let saved_text = self.text.clone();
                let base = form_matrix.concat(&self.ctm);
                if let Err(e) = self.run(&content, &form_resources, base, depth + 1) {
                    warn!(error = %e, "form XObject content undecodable, skipped");
                }
                self.ctm = saved_ctm;
                self.ctm_stack.truncate(saved_stack_len);
                self.text = saved_text;
                self.clear_path();
            }
            _ => {}
        }
    }
}

fn matrix_from_args(args: &[Object]) -> Option<Matrix> {
    if args.len() < 6 {
        return None;
    }
    Some(Matrix::new(
        as_f64(&args[0])?,
        as_f64(&args[1])?,
        as_f64(&args[2])?,
        as_f64(&args[3])?,
        as_f64(&args[4])?,
        as_f64(&args[5])?,
    ))
}

fn point_from_args(args: &[Object], offset: usize) -> Option<(f64, f64)> {
    Some((
        args.get(offset).and_then(as_f64)?,
        args.get(offset + 1).and_then(as_f64)?,
    ))
}
