use crate::RawImage;
use std::path::{Path, PathBuf};

// ── ExtractedImage ───────────────────────────────────────────────────────────

/// One image read from a page, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// 0-based index of the page the image was found on.
    pub page_index: usize,

    /// 0-based position of the image among the images of its page.
    pub image_index: usize,

    /// The image bytes exactly as they will be written.
    pub data: Vec<u8>,

    /// File extension without the dot (e.g. `"jpeg"`).
    pub extension: String,
}

impl ExtractedImage {
    pub fn new(page_index: usize, image_index: usize, raw: RawImage) -> Self {
        Self {
            page_index,
            image_index,
            data: raw.data,
            extension: raw.extension,
        }
    }

    /// The output file name, `page{N}_img{M}.{ext}` with 1-based numbers.
    ///
    /// ```
    /// # use pdfimageextract::ExtractedImage;
    /// let image = ExtractedImage { page_index: 0, image_index: 2, data: vec![], extension: "jpeg".into() };
    /// assert_eq!(image.file_name(), "page1_img3.jpeg");
    /// ```
    pub fn file_name(&self) -> String {
        format!(
            "page{}_img{}.{}",
            self.page_index + 1,
            self.image_index + 1,
            self.extension
        )
    }

    /// Write this image into `output_dir`, replacing a previous file of the
    /// same name. Returns the path written.
    ///
    /// The directory must already exist.
    pub fn save_to_disk<P: AsRef<Path>>(&self, output_dir: P) -> std::io::Result<PathBuf> {
        let dest = output_dir.as_ref().join(self.file_name());
        std::fs::write(&dest, &self.data)?;
        Ok(dest)
    }
}
