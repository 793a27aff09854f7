//! # pdfimageextract
//!
//! Walks a folder tree for PDF files and extracts the raster images embedded in
//! every page into one output folder per document.
//!
//! ## What this crate does
//!
//! 1. **Scan** — recursively finds every file whose name ends in `.pdf`
//!    (case-insensitive) below an input folder.
//! 2. **Extract** — opens each document with `lopdf`, lists the image
//!    XObjects of every page and writes their bytes to
//!    `<output>/<pdf stem>/page{N}_img{M}.{ext}`.
//! 3. **Report** — every step produces human-readable progress lines through a
//!    [`LogSink`]; failures on one image or one document are logged and the run
//!    carries on.
//! 4. **Dispatch** — [`Dispatcher`] runs the whole scan on a background thread
//!    and streams the progress lines back over a channel, so a UI thread never
//!    blocks.
//!
//! ## Quick example
//!
//! ```no_run
//! use pdfimageextract::{FolderWalker, LopdfBackend};
//! use std::path::Path;
//!
//! let walker = FolderWalker::new(LopdfBackend::default());
//! let summary = walker.process_folder(
//!     Path::new("./scans"),
//!     Path::new("./images"),
//!     &|line: &str| println!("{line}"),
//! );
//! println!("{} PDF(s), {} image(s)", summary.pdfs_found, summary.images_written);
//! ```

use thiserror::Error;

mod backend;
mod dispatch;
mod extractor;
mod image;
mod lopdf_backend;
mod pdf_utils;
mod sink;
mod walker;

pub mod ui;

pub use backend::{ImageDocument, ImageRef, PdfBackend, RawImage};
pub use dispatch::{Dispatcher, RunHandle, WorkerEvent};
pub use extractor::{ExtractionSummary, ImageExtractor};
pub use image::ExtractedImage;
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use sink::LogSink;
pub use walker::{is_pdf_file_name, FolderWalker, RunSummary};

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`ImageExtractor`] and everything built on it.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// If set, images whose byte content exceeds this limit are skipped and
    /// reported instead of written.
    pub max_image_size: Option<usize>,

    /// When `true`, decoded 8-bit gray and RGB samples are framed as binary
    /// PNM (`.pgm` / `.ppm`). When `false` they are written as raw `.bin`.
    pub wrap_pnm: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_image_size: None,
            wrap_pnm: true,
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A filesystem I/O error occurred (e.g. when creating a folder or writing an image).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    ParseError(#[from] lopdf::Error),

    /// An image reference does not point at a readable image stream.
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// An image exceeds the configured `max_image_size` limit.
    #[error("Image of {size} bytes exceeds the configured maximum of {limit} bytes")]
    ImageSizeExceeded { size: usize, limit: usize },

    /// The input or output folder was not chosen.
    #[error("Please select both input and output folders.")]
    MissingSelection,

    /// A run is already active on this dispatcher.
    #[error("An extraction run is already in progress")]
    RunInProgress,

    /// The desktop window could not be created.
    #[error("GUI error: {0}")]
    Gui(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
