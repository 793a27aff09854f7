use crate::{
    ExtractError, ExtractedImage, ExtractorConfig, ImageDocument, ImageRef, LogSink, LopdfBackend,
    PdfBackend, RawImage, Result,
};
use log::{debug, warn};
use std::path::Path;

/// Outcome of extracting one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// `false` when the document could not be opened (or its output folder
    /// could not be created), in which case nothing else was attempted.
    pub opened: bool,

    /// Images written to the output folder.
    pub images_written: usize,

    /// Images that were found but could not be read, were too large, or
    /// could not be written.
    pub images_failed: usize,
}

/// Extracts the images of a single PDF into a folder.
///
/// Every outcome is reported through the [`LogSink`]; failures never abort
/// more than the image (or document) they concern.
#[derive(Debug, Clone)]
pub struct ImageExtractor<B = LopdfBackend> {
    backend: B,
    config: ExtractorConfig,
}

impl Default for ImageExtractor<LopdfBackend> {
    fn default() -> Self {
        Self::with_config(ExtractorConfig::default())
    }
}

impl ImageExtractor<LopdfBackend> {
    /// An extractor on the lopdf backend using `config`.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            backend: LopdfBackend::new(&config),
            config,
        }
    }
}

impl<B: PdfBackend> ImageExtractor<B> {
    pub fn new(backend: B, config: ExtractorConfig) -> Self {
        Self { backend, config }
    }

    /// Extract every image of `pdf_path` into `output_dir`.
    ///
    /// The folder is created first (recursively). Images are written as
    /// `page{N}_img{M}.{ext}`, replacing files left by an earlier run.
    pub fn extract(&self, pdf_path: &Path, output_dir: &Path, sink: &dyn LogSink) -> ExtractionSummary {
        let mut summary = ExtractionSummary::default();
        let display_name = file_display_name(pdf_path);

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            sink.log(&format!(
                "Error creating output folder '{}': {}",
                output_dir.display(),
                e
            ));
            return summary;
        }

        let document = match self.backend.open(pdf_path) {
            Ok(document) => document,
            Err(e) => {
                warn!("failed to open {}: {}", pdf_path.display(), e);
                sink.log(&format!("Error opening {}: {}", display_name, e));
                return summary;
            }
        };
        summary.opened = true;

        for page_index in 0..document.page_count() {
            let images = document.page_images(page_index);
            debug!(
                "{}: page {} references {} image(s)",
                display_name,
                page_index + 1,
                images.len()
            );

            for (image_index, image_ref) in images.iter().enumerate() {
                let raw = match self.read_image(&document, image_ref) {
                    Ok(raw) => raw,
                    Err(e) => {
                        sink.log(&format!(
                            "Error reading image {} on page {} of {}: {}",
                            image_index + 1,
                            page_index + 1,
                            display_name,
                            e
                        ));
                        summary.images_failed += 1;
                        continue;
                    }
                };

                let image = ExtractedImage::new(page_index, image_index, raw);
                match image.save_to_disk(output_dir) {
                    Ok(dest) => {
                        debug!("wrote {}", dest.display());
                        summary.images_written += 1;
                    }
                    Err(e) => {
                        sink.log(&format!("Error saving image from {}: {}", display_name, e));
                        summary.images_failed += 1;
                    }
                }
            }
        }
        drop(document);

        if summary.images_written > 0 {
            sink.log(&format!(
                "  Extracted {} images to '{}'",
                summary.images_written,
                output_dir.display()
            ));
        } else {
            sink.log(&format!("  No images found in '{}'.", display_name));
        }

        summary
    }

    /// Read one image and check it against the configured size limit.
    fn read_image(&self, document: &B::Document, image_ref: &ImageRef) -> Result<RawImage> {
        let raw = document.extract_image(image_ref)?;

        if let Some(limit) = self.config.max_image_size {
            if raw.data.len() > limit {
                return Err(ExtractError::ImageSizeExceeded {
                    size: raw.data.len(),
                    limit,
                });
            }
        }

        Ok(raw)
    }
}

/// The file name component of `path`, or the whole path when it has none.
pub(crate) fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
