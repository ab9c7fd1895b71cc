//! Detection of "Unidad N: …" headings in extracted notes, and scoping of
//! the corpus to the units the user picked.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a unit heading anywhere on a line, e.g. "Unidad 2: Células".
static UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Unidad\s+\d+:[^\n]*").expect("unit heading regex is valid")
});

/// Find every unit heading in the corpus, sorted and deduplicated.
///
/// An empty result is not an error: it means the notes carry no unit
/// structure and the entire corpus should be used.
pub fn extract_units(text: &str) -> Vec<String> {
    let mut units: Vec<String> = UNIT_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end().to_string())
        .collect();
    units.sort();
    units.dedup();
    units
}

/// Keep only the sections belonging to the selected units.
///
/// A section runs from its unit heading line up to (not including) the next
/// unit heading. An empty selection means "use the entire corpus", never
/// "use nothing".
pub fn scope_to_units(text: &str, selected: &[String]) -> String {
    if selected.is_empty() {
        return text.to_string();
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut in_selected = false;
    for line in text.lines() {
        if let Some(m) = UNIT_RE.find(line) {
            in_selected = selected.iter().any(|u| u == m.as_str().trim_end());
        }
        if in_selected {
            kept.push(line);
        }
    }
    kept.join("\n")
}
