//! Parsing of human-entered page specifications ("1,2,5-10") and filtering
//! of backend pages against the resolved selection.

use std::collections::BTreeSet;

use thiserror::Error;

use repaso_core::PdfPage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageSpecError {
    #[error("malformed page token `{0}` (expected a number or start-end)")]
    MalformedToken(String),
    #[error("reversed range `{0}`: end is before start")]
    ReversedRange(String),
    #[error("page numbers start at 1 (got `{0}`)")]
    ZeroPage(String),
}

/// The resolved set of textbook pages the user wants included.
///
/// "No filter" is a distinguished value, not an empty set — the two must
/// never be conflated, since an empty set would select zero pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// No specification given: every page is included.
    All,
    /// Only the listed 1-based page numbers are included.
    Pages(BTreeSet<usize>),
}

impl PageSelection {
    /// Parse a comma-separated page specification.
    ///
    /// `None`, the empty string, and pure whitespace all mean "no filter".
    /// Any malformed token fails the whole parse — a partially-applied
    /// filter could silently hide book content from the learner.
    pub fn parse(spec: Option<&str>) -> Result<Self, PageSpecError> {
        let spec = match spec {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Ok(PageSelection::All),
        };

        let mut pages = BTreeSet::new();
        for token in spec.split(',') {
            let token = token.trim();
            match token.split_once('-') {
                Some((start, end)) => {
                    let start: usize = parse_number(start, token)?;
                    let end: usize = parse_number(end, token)?;
                    if end < start {
                        return Err(PageSpecError::ReversedRange(token.to_string()));
                    }
                    pages.extend(start..=end);
                }
                None => {
                    pages.insert(parse_number(token, token)?);
                }
            }
        }
        Ok(PageSelection::Pages(pages))
    }

    /// Whether the given 1-based page number is selected.
    pub fn contains(&self, page: usize) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }
}

fn parse_number(text: &str, token: &str) -> Result<usize, PageSpecError> {
    let n: usize = text
        .trim()
        .parse()
        .map_err(|_| PageSpecError::MalformedToken(token.to_string()))?;
    if n == 0 {
        return Err(PageSpecError::ZeroPage(token.to_string()));
    }
    Ok(n)
}

/// Keep only the pages whose 1-based number is selected, preserving the
/// input's ascending page order (overlapping or out-of-order range tokens
/// in the spec cannot reorder the output).
pub fn filter_pages(pages: Vec<PdfPage>, selection: &PageSelection) -> Vec<PdfPage> {
    match selection {
        PageSelection::All => pages,
        PageSelection::Pages(_) => pages
            .into_iter()
            .filter(|p| selection.contains(p.number))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: usize) -> PdfPage {
        PdfPage {
            number,
            text: format!("página {}", number),
            images: vec![],
        }
    }

    fn numbers(pages: &[PdfPage]) -> Vec<usize> {
        pages.iter().map(|p| p.number).collect()
    }

    #[test]
    fn absent_spec_means_no_filter() {
        assert_eq!(PageSelection::parse(None).unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse(Some("")).unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse(Some("   ")).unwrap(), PageSelection::All);
    }

    #[test]
    fn parses_singles_and_ranges() {
        let sel = PageSelection::parse(Some("1,2,5-10")).unwrap();
        let expected: BTreeSet<usize> = [1, 2, 5, 6, 7, 8, 9, 10].into_iter().collect();
        assert_eq!(sel, PageSelection::Pages(expected));
    }

    #[test]
    fn overlapping_ranges_dedupe() {
        let sel = PageSelection::parse(Some("3-5,4-6,5")).unwrap();
        let expected: BTreeSet<usize> = [3, 4, 5, 6].into_iter().collect();
        assert_eq!(sel, PageSelection::Pages(expected));
    }

    #[test]
    fn tokens_are_trimmed() {
        let sel = PageSelection::parse(Some(" 1 , 3 - 4 ")).unwrap();
        let expected: BTreeSet<usize> = [1, 3, 4].into_iter().collect();
        assert_eq!(sel, PageSelection::Pages(expected));
    }

    #[test]
    fn single_page_range_is_valid() {
        let sel = PageSelection::parse(Some("7-7")).unwrap();
        assert_eq!(sel, PageSelection::Pages([7].into_iter().collect()));
    }

    #[test]
    fn reversed_range_fails_wholesale() {
        let err = PageSelection::parse(Some("1,2-1")).unwrap_err();
        assert_eq!(err, PageSpecError::ReversedRange("2-1".to_string()));
    }

    #[test]
    fn non_numeric_token_fails_wholesale() {
        let err = PageSelection::parse(Some("abc")).unwrap_err();
        assert_eq!(err, PageSpecError::MalformedToken("abc".to_string()));
    }

    #[test]
    fn half_open_range_fails_wholesale() {
        let err = PageSelection::parse(Some("5-")).unwrap_err();
        assert_eq!(err, PageSpecError::MalformedToken("5-".to_string()));
        let err = PageSelection::parse(Some("-5")).unwrap_err();
        assert_eq!(err, PageSpecError::MalformedToken("-5".to_string()));
    }

    #[test]
    fn zero_page_fails_wholesale() {
        let err = PageSelection::parse(Some("0")).unwrap_err();
        assert_eq!(err, PageSpecError::ZeroPage("0".to_string()));
        let err = PageSelection::parse(Some("0-3")).unwrap_err();
        assert_eq!(err, PageSpecError::ZeroPage("0-3".to_string()));
    }

    #[test]
    fn filter_keeps_only_selected_pages_in_order() {
        let pages: Vec<PdfPage> = (1..=12).map(page).collect();
        let sel = PageSelection::parse(Some("5-10,1,2")).unwrap();
        let kept = filter_pages(pages, &sel);
        assert_eq!(numbers(&kept), [1, 2, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn filter_with_no_filter_returns_all_pages_unchanged() {
        let pages: Vec<PdfPage> = (1..=4).map(page).collect();
        let kept = filter_pages(pages, &PageSelection::All);
        assert_eq!(numbers(&kept), [1, 2, 3, 4]);
    }

    #[test]
    fn empty_set_selects_nothing() {
        // An empty explicit set is distinct from "no filter".
        let pages: Vec<PdfPage> = (1..=3).map(page).collect();
        let kept = filter_pages(pages, &PageSelection::Pages(BTreeSet::new()));
        assert!(kept.is_empty());
    }
}
