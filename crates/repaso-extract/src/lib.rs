use thiserror::Error;

pub mod docx;
pub mod pages;
pub mod pdf;
pub mod units;

// Re-export domain types from core (canonical definitions live there)
pub use repaso_core::{BackendError, ExtractedText, ImageCaptioner, PdfBackend, PdfPage, Segment, SegmentKind};
// Re-export the selector API
pub use pages::{PageSelection, PageSpecError, filter_pages};
pub use units::{extract_units, scope_to_units};

/// Hard cap on the corpus handed to the question generator, in characters.
pub const MAX_CORPUS_CHARS: usize = 8000;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("not a DOCX package: {0}")]
    DocxPackage(String),
    #[error("malformed document XML: {0}")]
    DocxXml(String),
    #[error("PDF backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result of extracting one document: the ordered segments plus any
/// non-fatal captioner warnings collected along the way.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub text: ExtractedText,
    pub warnings: Vec<String>,
}

/// Truncate a corpus to [`MAX_CORPUS_CHARS`] characters, on a char boundary.
pub fn truncate_corpus(corpus: &str) -> &str {
    match corpus.char_indices().nth(MAX_CORPUS_CHARS) {
        Some((byte_idx, _)) => &corpus[..byte_idx],
        None => corpus,
    }
}
