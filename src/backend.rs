use crate::Result;
use std::path::Path;

// ── Backend boundary ─────────────────────────────────────────────────────────
//
// Everything the extractor needs from a PDF library. The lopdf implementation
// lives in `lopdf_backend`; tests plug in their own documents.

/// Opens PDF documents from the file system.
pub trait PdfBackend {
    /// An open document. Dropping it releases the document.
    type Document: ImageDocument;

    /// Open the document at `path`. The error carries the library's
    /// diagnostic for the log.
    fn open(&self, path: &Path) -> Result<Self::Document>;
}

/// An open document that can list and read its page images.
pub trait ImageDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Images referenced by the page at `page_index` (0-based), in document order.
    fn page_images(&self, page_index: usize) -> Vec<ImageRef>;

    /// Read the bytes of one image together with its file extension.
    fn extract_image(&self, image: &ImageRef) -> Result<RawImage>;
}

/// Reference to an image object inside an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Object number of the image XObject.
    pub object: u32,
    /// Generation number of the image XObject.
    pub generation: u16,
}

impl From<lopdf::ObjectId> for ImageRef {
    fn from((object, generation): lopdf::ObjectId) -> Self {
        Self { object, generation }
    }
}

impl From<ImageRef> for lopdf::ObjectId {
    fn from(image: ImageRef) -> Self {
        (image.object, image.generation)
    }
}

/// Bytes of one image as stored in the document, plus the extension that
/// describes them (`"jpeg"`, `"jpx"`, `"ppm"`, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub data: Vec<u8>,
    pub extension: String,
}
