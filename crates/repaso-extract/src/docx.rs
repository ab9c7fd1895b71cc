//! Extraction of notes documents (DOCX packages).
//!
//! A DOCX file is a ZIP of XML parts. Body text lives in
//! `word/document.xml` as `<w:p>` paragraphs of `<w:t>` runs; embedded
//! images live under `word/media/`. Paragraphs become one `Body` segment
//! each — empty paragraphs included, so downstream line-based filtering
//! keeps the document's structural boundaries — followed by one
//! `ImageCaption` segment per media part, in enumeration order.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use repaso_core::{ExtractedText, ImageCaptioner, Segment};

use crate::{ExtractError, Extraction};

/// Extract a notes DOCX into ordered text segments.
///
/// Container-level failures (not a ZIP, missing or malformed document
/// part) fail the whole call. A captioner failure on one image does not:
/// it is logged, recorded as a warning, and that image contributes no
/// segment.
pub fn extract(bytes: &[u8], captioner: &dyn ImageCaptioner) -> Result<Extraction, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::DocxPackage(e.to_string()))?;

    let document_xml = read_part(&mut archive, "word/document.xml")?;
    let mut segments = parse_paragraphs(&document_xml)?;

    let mut warnings = Vec::new();
    for name in media_parts(&archive) {
        let image = read_part(&mut archive, &name)?;
        match captioner.describe(&image) {
            Ok(caption) if !caption.trim().is_empty() => {
                segments.push(Segment::caption(caption.trim()));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(part = %name, error = %e, "image captioning failed");
                warnings.push(format!("captioning failed for {}: {}", name, e));
            }
        }
    }

    Ok(Extraction {
        text: ExtractedText { segments },
        warnings,
    })
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, ExtractError> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| ExtractError::DocxPackage(format!("missing part {}: {}", name, e)))?;
    let mut buf = Vec::new();
    part.read_to_end(&mut buf)
        .map_err(|e| ExtractError::DocxPackage(format!("unreadable part {}: {}", name, e)))?;
    Ok(buf)
}

/// Media part names (`word/media/*`), sorted for deterministic order.
fn media_parts(archive: &ZipArchive<Cursor<&[u8]>>) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("word/media/"))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// Walk `word/document.xml`, emitting one `Body` segment per `<w:p>`.
fn parse_paragraphs(document_xml: &[u8]) -> Result<Vec<Segment>, ExtractError> {
    let mut reader = Reader::from_reader(document_xml);

    let mut segments = Vec::new();
    let mut buf = Vec::new();
    let mut in_paragraph = false;
    let mut in_text_run = false;
    let mut paragraph = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    paragraph.clear();
                }
                b"w:t" => in_text_run = in_paragraph,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // Self-closed paragraph: still a (blank) structural boundary.
                b"w:p" => segments.push(Segment::body("")),
                b"w:br" if in_paragraph => paragraph.push('\n'),
                b"w:tab" if in_paragraph => paragraph.push('\t'),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text_run {
                    paragraph.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:p" => {
                    segments.push(Segment::body(paragraph.as_str()));
                    in_paragraph = false;
                }
                b"w:t" => in_text_run = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractError::DocxXml(e.to_string())),
        }
        buf.clear();
    }

    Ok(segments)
}
