//! Extraction of textbook excerpts (paginated documents).
//!
//! The low-level page access comes from a [`PdfBackend`] collaborator;
//! this module filters the pages against the user's selection and
//! assembles the ordered segments, captioning embedded images along the
//! way.

use std::path::Path;

use repaso_core::{ExtractedText, ImageCaptioner, PdfBackend, PdfPage, Segment};

use crate::pages::{PageSelection, filter_pages};
use crate::{ExtractError, Extraction};

/// Extract the selected pages of a paginated document.
pub fn extract(
    path: &Path,
    backend: &dyn PdfBackend,
    selection: &PageSelection,
    captioner: &dyn ImageCaptioner,
) -> Result<Extraction, ExtractError> {
    let pages = backend.extract_pages(path)?;
    let selected = filter_pages(pages, selection);
    tracing::debug!(path = %path.display(), pages = selected.len(), "extracting book pages");
    Ok(extract_from_pages(&selected, captioner))
}

/// Assemble segments from already-filtered pages.
///
/// Per page: one `Body` segment with the page text, then one
/// `ImageCaption` segment per embedded image in enumeration order. A
/// captioner failure on one image is logged and recorded as a warning;
/// the surrounding loop never aborts.
pub fn extract_from_pages(pages: &[PdfPage], captioner: &dyn ImageCaptioner) -> Extraction {
    let mut segments = Vec::new();
    let mut warnings = Vec::new();

    for page in pages {
        segments.push(Segment::body(page.text.as_str()));
        for (i, image) in page.images.iter().enumerate() {
            match captioner.describe(image) {
                Ok(caption) if !caption.trim().is_empty() => {
                    segments.push(Segment::caption(caption.trim()));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        page = page.number,
                        image = i + 1,
                        error = %e,
                        "image captioning failed"
                    );
                    warnings.push(format!(
                        "captioning failed for page {} image {}: {}",
                        page.number,
                        i + 1,
                        e
                    ));
                }
            }
        }
    }

    Extraction {
        text: ExtractedText { segments },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repaso_core::{BackendError, CaptionError, SegmentKind};

    struct FakeBackend {
        pages: Vec<PdfPage>,
    }

    impl PdfBackend for FakeBackend {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<PdfPage>, BackendError> {
            Ok(self.pages.clone())
        }
    }

    struct FailingBackend;

    impl PdfBackend for FailingBackend {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<PdfPage>, BackendError> {
            Err(BackendError::Open("corrupt xref table".into()))
        }
    }

    /// Captions every image as its byte length; fails on empty images.
    struct LenCaptioner;

    impl ImageCaptioner for LenCaptioner {
        fn describe(&self, image: &[u8]) -> Result<String, CaptionError> {
            if image.is_empty() {
                Err(CaptionError::BadResponse("empty image".into()))
            } else {
                Ok(format!("imagen de {} bytes", image.len()))
            }
        }
    }

    fn page(number: usize, text: &str, images: Vec<Vec<u8>>) -> PdfPage {
        PdfPage {
            number,
            text: text.to_string(),
            images,
        }
    }

    #[test]
    fn pages_become_body_then_caption_segments() {
        let pages = vec![
            page(1, "primera página", vec![vec![1, 2, 3]]),
            page(2, "segunda página", vec![]),
        ];
        let extraction = extract_from_pages(&pages, &LenCaptioner);
        let kinds: Vec<SegmentKind> = extraction.text.segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SegmentKind::Body,
                SegmentKind::ImageCaption,
                SegmentKind::Body
            ]
        );
        assert_eq!(extraction.text.segments[1].text, "imagen de 3 bytes");
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn captions_stay_with_their_page() {
        let pages = vec![
            page(1, "p1", vec![vec![1], vec![1, 2]]),
            page(2, "p2", vec![vec![1, 2, 3]]),
        ];
        let extraction = extract_from_pages(&pages, &LenCaptioner);
        assert_eq!(
            extraction.text.corpus(),
            "p1\nimagen de 1 bytes\nimagen de 2 bytes\np2\nimagen de 3 bytes"
        );
    }

    #[test]
    fn one_caption_failure_does_not_abort_the_rest() {
        let pages = vec![page(3, "texto", vec![vec![], vec![9, 9]])];
        let extraction = extract_from_pages(&pages, &LenCaptioner);
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].contains("page 3 image 1"));
        let captions: Vec<&str> = extraction
            .text
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::ImageCaption)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(captions, ["imagen de 2 bytes"]);
    }

    #[test]
    fn extract_applies_the_page_selection() {
        let backend = FakeBackend {
            pages: (1..=12).map(|n| page(n, &format!("página {}", n), vec![])).collect(),
        };
        let selection = PageSelection::parse(Some("1,2,5-10")).unwrap();
        let extraction = extract(
            Path::new("libro.pdf"),
            &backend,
            &selection,
            &repaso_core::NoCaptioner,
        )
        .unwrap();
        let texts: Vec<&str> = extraction
            .text
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(
            texts,
            [
                "página 1",
                "página 2",
                "página 5",
                "página 6",
                "página 7",
                "página 8",
                "página 9",
                "página 10"
            ]
        );
    }

    #[test]
    fn backend_failure_is_fatal_to_the_call() {
        let selection = PageSelection::All;
        let err = extract(
            Path::new("roto.pdf"),
            &FailingBackend,
            &selection,
            &repaso_core::NoCaptioner,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::Backend(_)));
    }
}
