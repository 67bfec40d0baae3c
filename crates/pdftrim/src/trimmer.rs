//! Document-level trimming: detect bounds on every page, narrow each
//! page's `/CropBox`, and write the result out.

use std::path::{Path, PathBuf};

use pdftrim_core::{compute_crop_box, TrimError};
use pdftrim_parse::PdfDocument;
use tracing::{debug, info, instrument};

use crate::scheduler::detect_pages;

/// Default whitespace margin kept around detected content, in points.
pub const DEFAULT_MARGIN: f64 = 10.0;

/// Worker threads used for detection when the caller does not choose.
fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8)
}

/// Whitespace trimmer with configurable margin and parallelism.
///
/// ```no_run
/// use pdftrim::Trimmer;
///
/// let trimmer = Trimmer::new().with_margin(5.0);
/// let out = trimmer.trim_file("report.pdf", None)?;
/// # Ok::<(), pdftrim::TrimError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Trimmer {
    margin: f64,
    max_threads: usize,
}

impl Default for Trimmer {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            max_threads: default_thread_count(),
        }
    }
}

impl Trimmer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Margin in points kept around the detected content. Must be
    /// non-negative; validated when trimming runs.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Cap on detection worker threads. `1` forces the sequential path.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    /// Trim whitespace from the PDF at `input`.
    ///
    /// With `output = None` the input is overwritten in place, via a
    /// temporary file in the same directory so the original is never
    /// left half-written. With a distinct `output` the trimmed document
    /// is written there, creating parent directories as needed. When no
    /// page changed, nothing is written and the input path is returned
    /// unchanged.
    ///
    /// Returns the path holding the result.
    #[instrument(skip_all, fields(input = %input.as_ref().display()))]
    pub fn trim_file(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> Result<PathBuf, TrimError> {
        let input = input.as_ref();
        if self.margin.is_nan() || self.margin < 0.0 {
            return Err(TrimError::InvalidMargin(self.margin));
        }
        if !input.is_file() {
            return Err(TrimError::DocumentNotFound(input.display().to_string()));
        }

        let mut doc = PdfDocument::open(input)?;
        let modified = self.trim_document(&mut doc)?;
        if modified == 0 {
            info!("no page needed trimming, nothing written");
            return Ok(input.to_path_buf());
        }

        match output {
            Some(out) if out != input => {
                if let Some(parent) = out.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                doc.save(out)?;
                info!(output = %out.display(), modified, "trimmed document written");
                Ok(out.to_path_buf())
            }
            _ => {
                let dir = input.parent().filter(|p| !p.as_os_str().is_empty());
                let mut tmp = match dir {
                    Some(d) => tempfile::NamedTempFile::new_in(d)?,
                    None => tempfile::NamedTempFile::new()?,
                };
                doc.save_to(tmp.as_file_mut())?;
                tmp.persist(input)
                    .map_err(|e| TrimError::IoError(e.to_string()))?;
                info!(modified, "input overwritten in place");
                Ok(input.to_path_buf())
            }
        }
    }

    /// Detect and apply crops on an already-open document. Returns how
    /// many pages changed.
    pub fn trim_document(&self, doc: &mut PdfDocument) -> Result<usize, TrimError> {
        if self.margin.is_nan() || self.margin < 0.0 {
            return Err(TrimError::InvalidMargin(self.margin));
        }

        let page_ids = doc.page_ids();
        let results = detect_pages(doc, self.max_threads);

        let mut modified = 0usize;
        for result in &results {
            let page_id = page_ids[result.page_index];
            let media_box = doc.media_box(page_id).map_err(TrimError::from)?;
            let current = doc.crop_box(page_id).unwrap_or(media_box);

            if let Some(new_box) = compute_crop_box(
                &media_box,
                &current,
                result.content_bounds.as_ref(),
                self.margin,
            ) {
                doc.set_crop_box(page_id, &new_box)
                    .map_err(TrimError::from)?;
                modified += 1;
                debug!(
                    page = result.page_index + 1,
                    x0 = new_box.x0,
                    y0 = new_box.y0,
                    x1 = new_box.x1,
                    y1 = new_box.y1,
                    "crop box narrowed"
                );
            }
        }
        info!(pages = page_ids.len(), modified, "trim pass complete");
        Ok(modified)
    }
}

/// Trim whitespace from `input` with the given margin.
///
/// Convenience wrapper over [`Trimmer`] for the common one-shot case.
pub fn trim_whitespace(
    input: impl AsRef<Path>,
    margin: f64,
    output: Option<&Path>,
) -> Result<PathBuf, TrimError> {
    Trimmer::new().with_margin(margin).trim_file(input, output)
}
