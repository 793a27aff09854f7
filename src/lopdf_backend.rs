use crate::pdf_utils;
use crate::{ExtractError, ExtractorConfig, ImageDocument, ImageRef, PdfBackend, RawImage, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use log::debug;
use std::collections::HashSet;
use std::path::Path;

/// Stream filters whose encoded bytes are a complete image file on their own.
/// The pair is `(filter name, file extension)`.
const PASSTHROUGH_FILTERS: &[(&[u8], &str)] = &[
    (b"DCTDecode", "jpeg"),
    (b"JPXDecode", "jpx"),
    (b"JBIG2Decode", "jb2"),
    (b"CCITTFaxDecode", "fax"),
];

/// Parent chains longer than this are treated as malformed.
const MAX_PARENT_DEPTH: usize = 32;

// ── LopdfBackend ─────────────────────────────────────────────────────────────

/// [`PdfBackend`] implemented on `lopdf`.
#[derive(Debug, Clone, Copy)]
pub struct LopdfBackend {
    wrap_pnm: bool,
}

impl LopdfBackend {
    /// A backend following the output options of `config`.
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            wrap_pnm: config.wrap_pnm,
        }
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn open(&self, path: &Path) -> Result<LopdfDocument> {
        let document = Document::load(path)?;
        Ok(LopdfDocument::from_document(document, self.wrap_pnm))
    }
}

// ── LopdfDocument ────────────────────────────────────────────────────────────

/// An open PDF document.
pub struct LopdfDocument {
    document: Document,
    pages: Vec<ObjectId>,
    wrap_pnm: bool,
}

impl LopdfDocument {
    /// Wrap an already parsed document.
    pub fn from_document(document: Document, wrap_pnm: bool) -> Self {
        // get_pages is keyed by 1-based page number, so values come out in page order
        let pages = document.get_pages().into_values().collect();
        Self {
            document,
            pages,
            wrap_pnm,
        }
    }

    /// The `/Resources` of a page, inherited from the `/Parent` chain when
    /// the page has none of its own.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = self.document.get_object(page_id).ok()?.as_dict().ok()?;

        for _ in 0..MAX_PARENT_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return pdf_utils::resolve_dict(&self.document, resources);
            }
            let parent = node.get(b"Parent").ok()?;
            node = pdf_utils::resolve_dict(&self.document, parent)?;
        }

        None
    }

    /// Object ids listed in the `/XObject` sub-dictionary of `resources`, in
    /// dictionary order.
    fn xobject_ids(&self, resources: &Dictionary) -> Vec<ObjectId> {
        let xobjects = match resources
            .get(b"XObject")
            .ok()
            .and_then(|x| pdf_utils::resolve_dict(&self.document, x))
        {
            Some(dict) => dict,
            None => return Vec::new(),
        };

        xobjects
            .iter()
            .filter_map(|(_, value)| value.as_reference().ok())
            .collect()
    }

    /// Add `id` to `images` if it is an image, or search it when it is a form
    /// XObject. `seen` keeps every object to a single visit per page.
    fn collect_images(&self, id: ObjectId, images: &mut Vec<ImageRef>, seen: &mut HashSet<ObjectId>) {
        if !seen.insert(id) {
            return;
        }

        let stream = match self.document.get_object(id) {
            Ok(Object::Stream(stream)) => stream,
            _ => return,
        };

        match pdf_utils::name_from_dict(&self.document, &stream.dict, b"Subtype") {
            Some(b"Image") => images.push(id.into()),
            Some(b"Form") => {
                let resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| pdf_utils::resolve_dict(&self.document, r));
                if let Some(resources) = resources {
                    for child in self.xobject_ids(resources) {
                        self.collect_images(child, images, seen);
                    }
                }
            }
            _ => {}
        }
    }

    fn image_stream(&self, image: &ImageRef) -> Result<&Stream> {
        match self.document.get_object((*image).into())? {
            Object::Stream(stream) => Ok(stream),
            _ => Err(ExtractError::UnsupportedImage(format!(
                "object {} {} is not a stream",
                image.object, image.generation
            ))),
        }
    }

    /// Turn fully decoded samples into an image file when the layout is one
    /// PNM can frame directly, otherwise keep them as raw bytes.
    fn frame_samples(&self, dict: &Dictionary, samples: Vec<u8>) -> RawImage {
        if self.wrap_pnm {
            if let Some(framed) = self.pnm_frame(dict, &samples) {
                return framed;
            }
        }
        RawImage {
            data: samples,
            extension: "bin".into(),
        }
    }

    fn pnm_frame(&self, dict: &Dictionary, samples: &[u8]) -> Option<RawImage> {
        let doc = &self.document;
        let width = pdf_utils::usize_from_dict(doc, dict, b"Width")?;
        let height = pdf_utils::usize_from_dict(doc, dict, b"Height")?;
        let bits = pdf_utils::usize_from_dict(doc, dict, b"BitsPerComponent")?;
        let color_space = pdf_utils::name_from_dict(doc, dict, b"ColorSpace")?;

        let (magic, components, extension) = match color_space {
            b"DeviceGray" => ("P5", 1, "pgm"),
            b"DeviceRGB" => ("P6", 3, "ppm"),
            _ => return None,
        };

        if bits != 8 || width == 0 || height == 0 {
            return None;
        }
        if width.checked_mul(height)?.checked_mul(components)? != samples.len() {
            return None;
        }

        let mut data = format!("{magic}\n{width} {height}\n255\n").into_bytes();
        data.extend_from_slice(samples);
        Some(RawImage {
            data,
            extension: extension.into(),
        })
    }
}

impl ImageDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_images(&self, page_index: usize) -> Vec<ImageRef> {
        let mut images = Vec::new();

        let Some(&page_id) = self.pages.get(page_index) else {
            return images;
        };
        let Some(resources) = self.page_resources(page_id) else {
            return images;
        };

        let mut seen = HashSet::new();
        for id in self.xobject_ids(resources) {
            self.collect_images(id, &mut images, &mut seen);
        }
        images
    }

    fn extract_image(&self, image: &ImageRef) -> Result<RawImage> {
        let stream = self.image_stream(image)?;
        let filters = pdf_utils::filter_names(&self.document, &stream.dict);

        let passthrough = filters.last().and_then(|last| {
            PASSTHROUGH_FILTERS
                .iter()
                .find(|(name, _)| *name == last.as_slice())
                .map(|(_, ext)| *ext)
        });

        if let Some(extension) = passthrough {
            let data = if filters.len() == 1 {
                stream.content.clone()
            } else {
                match decode_prefix(stream, &filters[..filters.len() - 1]) {
                    Ok(data) => data,
                    Err(lopdf::Error::Unimplemented(what)) => return Ok(undecoded(stream, what)),
                    Err(e) => return Err(e.into()),
                }
            };
            return Ok(RawImage {
                data,
                extension: extension.into(),
            });
        }

        let samples = if filters.is_empty() {
            stream.content.clone()
        } else {
            match stream.decompressed_content() {
                Ok(samples) => samples,
                Err(lopdf::Error::Unimplemented(what)) => return Ok(undecoded(stream, what)),
                Err(e) => return Err(e.into()),
            }
        };
        Ok(self.frame_samples(&stream.dict, samples))
    }
}

/// Apply only the leading `filters` of a chain, leaving the bytes in the
/// encoding of the final (image) filter.
fn decode_prefix(stream: &Stream, filters: &[Vec<u8>]) -> lopdf::Result<Vec<u8>> {
    let mut dict = stream.dict.clone();
    dict.set(
        "Filter",
        Object::Array(filters.iter().cloned().map(Object::Name).collect()),
    );

    match dict.get(b"DecodeParms").ok().cloned() {
        Some(Object::Array(mut params)) => {
            params.truncate(filters.len());
            dict.set("DecodeParms", Object::Array(params));
        }
        Some(_) => {
            dict.remove(b"DecodeParms");
        }
        None => {}
    }

    Stream::new(dict, stream.content.clone()).decompressed_content()
}

/// The stored bytes of a stream whose filter chain lopdf cannot decode
/// (ASCIIHex, RunLength). They are kept as `.bin` rather than dropped.
fn undecoded(stream: &Stream, reason: &str) -> RawImage {
    debug!("keeping encoded image bytes, lopdf lacks {reason}");
    RawImage {
        data: stream.content.clone(),
        extension: "bin".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn wrap(document: Document) -> LopdfDocument {
        LopdfDocument {
            document,
            pages: Vec::new(),
            wrap_pnm: true,
        }
    }

    fn document_with(image: Stream) -> (LopdfDocument, ImageRef) {
        let mut doc = Document::with_version("1.5");
        let id = doc.add_object(image);
        (wrap(doc), id.into())
    }

    fn rgb_2x1(samples: Vec<u8>) -> Stream {
        Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => Object::Integer(2),
                "Height" => Object::Integer(1),
                "BitsPerComponent" => Object::Integer(8),
                "ColorSpace" => "DeviceRGB",
            },
            samples,
        )
    }

    #[test]
    fn jpeg_bytes_pass_through_unchanged() {
        let jpeg = b"\xFF\xD8\xFF\xE0not really a jpeg\xFF\xD9".to_vec();
        let (doc, id) = document_with(Stream::new(
            dictionary! { "Subtype" => "Image", "Filter" => "DCTDecode" },
            jpeg.clone(),
        ));

        let raw = doc.extract_image(&id).unwrap();
        assert_eq!(raw.extension, "jpeg");
        assert_eq!(raw.data, jpeg);
    }

    #[test]
    fn filter_array_uses_last_entry_for_format() {
        let (doc, id) = document_with(Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Filter" => vec![Object::Name(b"JPXDecode".to_vec())],
            },
            b"jp2".to_vec(),
        ));

        assert_eq!(doc.extract_image(&id).unwrap().extension, "jpx");
    }

    #[test]
    fn unfiltered_rgb_samples_become_ppm() {
        let (doc, id) = document_with(rgb_2x1(vec![255, 0, 0, 0, 255, 0]));

        let raw = doc.extract_image(&id).unwrap();
        assert_eq!(raw.extension, "ppm");
        assert!(raw.data.starts_with(b"P6\n2 1\n255\n"));
        assert!(raw.data.ends_with(&[255, 0, 0, 0, 255, 0]));
    }

    #[test]
    fn raw_output_skips_pnm_header() {
        let mut doc = Document::with_version("1.5");
        let id = doc.add_object(rgb_2x1(vec![255, 0, 0, 0, 255, 0]));
        let doc = LopdfDocument {
            document: doc,
            pages: Vec::new(),
            wrap_pnm: false,
        };

        let raw = doc.extract_image(&id.into()).unwrap();
        assert_eq!(raw.extension, "bin");
        assert_eq!(raw.data, vec![255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn undecodable_filter_keeps_stored_bytes() {
        let mut image = rgb_2x1(b"FF0000 00FF00>".to_vec());
        image.dict.set("Filter", "ASCIIHexDecode");
        let (doc, id) = document_with(image);

        let raw = doc.extract_image(&id).unwrap();
        assert_eq!(raw.extension, "bin");
        assert_eq!(raw.data, b"FF0000 00FF00>");
    }

    #[test]
    fn undecodable_prefix_before_jpeg_keeps_stored_bytes() {
        let (doc, id) = document_with(Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Filter" => vec![
                    Object::Name(b"RunLengthDecode".to_vec()),
                    Object::Name(b"DCTDecode".to_vec()),
                ],
            },
            vec![3, 0xFF, 0xD8, 0xFF, 0xD9, 128],
        ));

        let raw = doc.extract_image(&id).unwrap();
        assert_eq!(raw.extension, "bin");
        assert_eq!(raw.data, vec![3, 0xFF, 0xD8, 0xFF, 0xD9, 128]);
    }

    #[test]
    fn mismatched_sample_length_stays_raw() {
        let (doc, id) = document_with(Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => Object::Integer(4),
                "Height" => Object::Integer(4),
                "BitsPerComponent" => Object::Integer(8),
                "ColorSpace" => "DeviceGray",
            },
            vec![0; 3],
        ));

        let raw = doc.extract_image(&id).unwrap();
        assert_eq!(raw.extension, "bin");
        assert_eq!(raw.data, vec![0; 3]);
    }

    #[test]
    fn non_stream_reference_is_rejected() {
        let mut doc = Document::with_version("1.5");
        let id = doc.add_object(Object::Integer(7));
        let doc = wrap(doc);

        assert!(matches!(
            doc.extract_image(&id.into()),
            Err(ExtractError::UnsupportedImage(_))
        ));
    }
}
