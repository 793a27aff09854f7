use crate::extractor::file_display_name;
use crate::{ExtractorConfig, ImageExtractor, LogSink, LopdfBackend, PdfBackend};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Totals of one folder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files with a `.pdf` name that were handed to the extractor.
    pub pdfs_found: usize,

    /// Images written across all documents.
    pub images_written: usize,

    /// Documents that could not be opened.
    pub documents_failed: usize,
}

/// Returns `true` when `name` ends in `.pdf`, compared case-insensitively.
///
/// ```
/// # use pdfimageextract::is_pdf_file_name;
/// assert!(is_pdf_file_name("Scan.PDF"));
/// assert!(!is_pdf_file_name("notes.pdf.txt"));
/// ```
pub fn is_pdf_file_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// Scans a folder tree for PDF files and runs an [`ImageExtractor`] on each.
#[derive(Debug, Clone)]
pub struct FolderWalker<B = LopdfBackend> {
    extractor: ImageExtractor<B>,
}

impl FolderWalker<LopdfBackend> {
    /// A walker on the lopdf backend using `config`.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self::from_extractor(ImageExtractor::with_config(config))
    }
}

impl<B: PdfBackend> FolderWalker<B> {
    /// A walker using `backend` with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::from_extractor(ImageExtractor::new(backend, ExtractorConfig::default()))
    }

    pub fn from_extractor(extractor: ImageExtractor<B>) -> Self {
        Self { extractor }
    }

    /// Extract the images of every PDF below `input_dir`.
    ///
    /// Each PDF gets its own folder `output_root/<file stem>`. A document that
    /// cannot be opened is reported and skipped; the walk always completes.
    pub fn process_folder(&self, input_dir: &Path, output_root: &Path, sink: &dyn LogSink) -> RunSummary {
        sink.log(&format!("Scanning for PDFs in '{}'...", input_dir.display()));

        let mut summary = RunSummary::default();
        self.visit(input_dir, output_root, sink, &mut summary);

        if summary.pdfs_found == 0 {
            sink.log("No PDF files were found.");
        } else {
            sink.log(&format!(
                "Finished. Processed {} PDF file(s).",
                summary.pdfs_found
            ));
        }

        summary
    }

    /// Handle the files of `dir` in name order, then descend into its
    /// subfolders.
    fn visit(&self, dir: &Path, output_root: &Path, sink: &dyn LogSink, summary: &mut RunSummary) {
        let (files, subdirs) = match list_folder(dir) {
            Ok(listing) => listing,
            Err(e) => {
                warn!("cannot read {}: {}", dir.display(), e);
                sink.log(&format!("Cannot read folder '{}': {}", dir.display(), e));
                return;
            }
        };

        for path in files {
            let name = file_display_name(&path);
            if !is_pdf_file_name(&name) {
                continue;
            }

            summary.pdfs_found += 1;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            let destination = output_root.join(stem);

            sink.log(&format!("Processing '{}'...", name));
            let result = self.extractor.extract(&path, &destination, sink);
            if !result.opened {
                summary.documents_failed += 1;
            }
            summary.images_written += result.images_written;
        }

        for subdir in subdirs {
            self.visit(&subdir, output_root, sink, summary);
        }
    }
}

/// Split the entries of `dir` into files and subfolders, both sorted by path.
///
/// Symlinks are listed as files unless they point at a folder, in which case
/// they are left out so the walk never leaves the tree or loops.
fn list_folder(dir: &Path) -> std::io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                debug!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_symlink() && path.is_dir() {
            debug!("not following folder link {}", path.display());
        } else {
            files.push(path);
        }
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}
