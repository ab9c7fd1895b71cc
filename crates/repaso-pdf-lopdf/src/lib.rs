use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use repaso_core::{BackendError, PdfBackend, PdfPage};

/// Pure-Rust implementation of [`PdfBackend`] on top of `lopdf`.
///
/// Unlike the MuPDF backend, this one walks each page's XObject
/// resources and returns the embedded image streams, so textbook images
/// reach the captioner. Images stored with DCT/JPX filters come out as
/// the JPEG/JPEG 2000 bytes the captioning endpoint accepts; other
/// filters pass through as stored.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LopdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PdfPage>, BackendError> {
        let doc = Document::load(path).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut pages = Vec::new();
        for (number, page_id) in doc.get_pages() {
            let text = doc
                .extract_text(&[number])
                .map_err(|e| BackendError::Extraction(e.to_string()))?;
            pages.push(PdfPage {
                number: number as usize,
                text,
                images: page_images(&doc, page_id),
            });
        }
        Ok(pages)
    }
}

/// Image streams referenced by a page's XObject resources, sorted by
/// resource name for deterministic order.
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
    let Some(resources) = page_resources(doc, page_id) else {
        return Vec::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve_dict(doc, obj))
    else {
        return Vec::new();
    };

    let mut named: Vec<(&[u8], Vec<u8>)> = Vec::new();
    for (name, entry) in xobjects.iter() {
        let Ok(id) = entry.as_reference() else {
            continue;
        };
        let Ok(Object::Stream(stream)) = doc.get_object(id) else {
            continue;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|s| s.as_name().ok())
            == Some(b"Image".as_slice());
        if is_image {
            named.push((name.as_slice(), stream.content.clone()));
        }
    }
    named.sort_by(|a, b| a.0.cmp(b.0));
    named.into_iter().map(|(_, bytes)| bytes).collect()
}

/// The page's Resources dictionary, following the Parent chain when the
/// page inherits it from a Pages node.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(obj) = dict.get(b"Resources") {
            return resolve_dict(doc, obj);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    const JPEG_A: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0xAA, 0xFF, 0xD9];
    const JPEG_B: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0xBB, 0xFF, 0xD9];

    /// One-page document with body text, the named image XObjects, and
    /// optionally a (non-image) Form XObject.
    fn build_pdf(images: &[(&str, &[u8])], with_form: bool) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut xobjects = Dictionary::new();
        for (name, bytes) in images {
            let id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.to_vec(),
            ));
            xobjects.set(*name, Object::Reference(id));
        }
        if with_form {
            let id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
                },
                Vec::new(),
            ));
            xobjects.set("Fm0", Object::Reference(id));
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => Object::Dictionary(xobjects),
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal("Unidad 4: Fuerzas")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn save(mut doc: Document, dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        doc.save(&path).expect("pdf saves");
        path
    }

    #[test]
    fn extracts_page_text_with_one_based_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(build_pdf(&[], false), &dir, "texto.pdf");

        let pages = LopdfBackend::new().extract_pages(&path).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert!(pages[0].text.contains("Unidad 4: Fuerzas"));
        assert!(pages[0].images.is_empty());
    }

    #[test]
    fn embedded_images_come_back_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        // Inserted out of name order on purpose.
        let path = save(
            build_pdf(&[("Im2", JPEG_B), ("Im1", JPEG_A)], false),
            &dir,
            "imagenes.pdf",
        );

        let pages = LopdfBackend::new().extract_pages(&path).unwrap();
        assert_eq!(pages[0].images.len(), 2);
        assert_eq!(pages[0].images[0], JPEG_A);
        assert_eq!(pages[0].images[1], JPEG_B);
    }

    #[test]
    fn non_image_xobjects_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(build_pdf(&[("Im1", JPEG_A)], true), &dir, "mixto.pdf");

        let pages = LopdfBackend::new().extract_pages(&path).unwrap();
        assert_eq!(pages[0].images.len(), 1);
        assert_eq!(pages[0].images[0], JPEG_A);
    }

    #[test]
    fn non_pdf_bytes_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = LopdfBackend::new().extract_pages(&path).unwrap_err();
        assert!(matches!(err, BackendError::Open(_)));
    }
}
