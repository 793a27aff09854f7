// Fixture helpers shared by the integration tests.
//
// PDFs are assembled with lopdf so no binary fixtures need to be checked in.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pdfimageextract::{ImageDocument, ImageRef, PdfBackend, RawImage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const FAKE_JPEG: &[u8] = b"\xFF\xD8\xFF\xE0fake jpeg payload\xFF\xD9";

/// A JPEG image XObject with distinguishable content.
pub fn jpeg_stream(tag: u8) -> Stream {
    let mut data = FAKE_JPEG.to_vec();
    data.push(tag);
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(1),
            "Height" => Object::Integer(1),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "DCTDecode",
        },
        data,
    )
}

/// Builds a PDF page by page. Each page lists the XObjects in its resources.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    inherited: Option<lopdf::Dictionary>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            inherited: None,
        }
    }

    /// Store an object and return its id.
    pub fn add(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Add a page whose `/XObject` resources are `xobjects`, in that order.
    pub fn page(&mut self, xobjects: &[ObjectId]) -> &mut Self {
        let resources = dictionary! { "XObject" => xobject_dict(xobjects) };
        self.push_page(Some(resources))
    }

    /// Put `xobjects` in the resources of the `/Pages` node instead of on a page.
    pub fn inherited_resources(&mut self, xobjects: &[ObjectId]) -> &mut Self {
        self.inherited = Some(dictionary! { "XObject" => xobject_dict(xobjects) });
        self
    }

    /// Add a page without `/Resources` of its own.
    pub fn bare_page(&mut self) -> &mut Self {
        self.push_page(None)
    }

    fn push_page(&mut self, resources: Option<lopdf::Dictionary>) -> &mut Self {
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        };
        if let Some(resources) = resources {
            page.set("Resources", resources);
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(Object::Reference(page_id));
        self
    }

    pub fn save(&mut self, path: &Path) {
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids.clone(),
            "Count" => Object::Integer(self.kids.len() as i64),
        };
        if let Some(resources) = self.inherited.clone() {
            pages.set("Resources", resources);
        }
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        self.doc.save(path).unwrap();
    }
}

fn xobject_dict(xobjects: &[ObjectId]) -> lopdf::Dictionary {
    let mut dict = lopdf::Dictionary::new();
    for (i, id) in xobjects.iter().enumerate() {
        dict.set(format!("Im{}", i + 1), Object::Reference(*id));
    }
    dict
}

/// A single-page PDF with `count` JPEG images.
pub fn write_pdf_with_images(path: &Path, count: usize) {
    let mut builder = PdfBuilder::new();
    let ids: Vec<_> = (0..count).map(|i| builder.add(jpeg_stream(i as u8))).collect();
    builder.page(&ids).save(path);
}

pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── Mock backends ────────────────────────────────────────────────────────────

/// Records every path it is asked to open and serves documents whose pages
/// are described by `pages` (number of images per page).
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub opened: Arc<Mutex<Vec<PathBuf>>>,
    pub pages: Vec<usize>,
}

pub struct MockDocument {
    pages: Vec<usize>,
}

impl PdfBackend for RecordingBackend {
    type Document = MockDocument;

    fn open(&self, path: &Path) -> pdfimageextract::Result<MockDocument> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(MockDocument {
            pages: self.pages.clone(),
        })
    }
}

impl ImageDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_images(&self, page_index: usize) -> Vec<ImageRef> {
        (0..self.pages[page_index])
            .map(|i| ImageRef {
                object: (page_index * 100 + i) as u32,
                generation: 0,
            })
            .collect()
    }

    fn extract_image(&self, image: &ImageRef) -> pdfimageextract::Result<RawImage> {
        Ok(RawImage {
            data: image.object.to_le_bytes().to_vec(),
            extension: "png".into(),
        })
    }
}

/// Panics as soon as a document is opened.
#[derive(Clone, Default)]
pub struct PanickingBackend;

impl PdfBackend for PanickingBackend {
    type Document = MockDocument;

    fn open(&self, _path: &Path) -> pdfimageextract::Result<MockDocument> {
        panic!("backend exploded");
    }
}

/// Blocks every open until the test sends a signal (or drops the sender).
#[derive(Clone)]
pub struct GatedBackend {
    pub gate: Arc<Mutex<std::sync::mpsc::Receiver<()>>>,
}

impl PdfBackend for GatedBackend {
    type Document = MockDocument;

    fn open(&self, _path: &Path) -> pdfimageextract::Result<MockDocument> {
        let _ = self.gate.lock().unwrap().recv();
        Ok(MockDocument { pages: vec![] })
    }
}
