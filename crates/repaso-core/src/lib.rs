use std::path::Path;

use thiserror::Error;

pub mod config_file;
pub mod export;
pub mod validate;

// Re-export for convenience
pub use config_file::{ConfigFile, config_path, load_config};
pub use export::{CSV_HEADER, ExportError, ExportRow, TIME_OPTIONS, to_export_rows, write_csv};
pub use validate::{
    OPTION_MAX_CHARS, PROMPT_MAX_CHARS, LengthField, LengthWarning, Rejection, RejectReason,
    ResponseError, ValidationReport, validate_response,
};

/// Upper bound on questions per quiz (the hosted generator refuses more).
pub const MAX_QUESTIONS: u32 = 50;

/// Where a text segment came from within the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A paragraph (DOCX) or a page's text (PDF).
    Body,
    /// Text produced by the image captioner for an embedded image.
    ImageCaption,
}

/// One ordered piece of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Body,
            text: text.into(),
        }
    }

    pub fn caption(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::ImageCaption,
            text: text.into(),
        }
    }
}

/// Ordered text segments extracted from one document.
///
/// Segment order is stable and matches source-document order; caption
/// segments never reorder relative to the body text around them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub segments: Vec<Segment>,
}

impl ExtractedText {
    /// Concatenate all segments, in source order, into the corpus string
    /// handed to the question generator.
    pub fn corpus(&self) -> String {
        let texts: Vec<&str> = self.segments.iter().map(|s| s.text.as_str()).collect();
        texts.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// One page handed over by a [`PdfBackend`].
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    /// 1-based page number in the source document.
    pub number: usize,
    pub text: String,
    /// Embedded images on this page, in enumeration order, as encoded
    /// image bytes (PNG/JPEG as stored in the container).
    pub images: Vec<Vec<u8>>,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for paginated-document (PDF) extraction backends.
///
/// Implementors provide the low-level page access; the extraction pipeline
/// (page filtering, segment assembly, captioning) lives in `repaso-extract`.
pub trait PdfBackend: Send + Sync {
    /// Extract every page of the document, in order, with 1-based numbers.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PdfPage>, BackendError>;
}

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("caption request failed: {0}")]
    Request(String),
    #[error("caption response malformed: {0}")]
    BadResponse(String),
}

/// Trait for the hosted image-description collaborator.
///
/// A single failed call is non-fatal to extraction: the caller logs it,
/// records a warning, and moves on to the next image.
pub trait ImageCaptioner: Send + Sync {
    /// Describe one embedded image (encoded bytes as stored in the document).
    fn describe(&self, image: &[u8]) -> Result<String, CaptionError>;
}

/// Captioner used when no captioning endpoint is configured.
///
/// Always succeeds with an empty description, which the extraction pipeline
/// drops, so documents extract cleanly with no caption segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptioner;

impl ImageCaptioner for NoCaptioner {
    fn describe(&self, _image: &[u8]) -> Result<String, CaptionError> {
        Ok(String::new())
    }
}

/// Prompt language requested from the question generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "spanish" => Ok(Language::Spanish),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("unknown language `{}` (expected es or en)", other)),
        }
    }
}

/// A validated multiple-choice quiz question.
///
/// Only [`validate::validate_response`] constructs these from untrusted
/// generator output; anything that fails its checks never becomes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: [String; 4],
    /// 1-based index into `options`.
    pub correct_index: u8,
}
