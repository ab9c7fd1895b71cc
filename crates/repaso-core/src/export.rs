//! Projection of validated questions into the quiz platform's spreadsheet
//! import format.

use thiserror::Error;

use crate::QuizQuestion;

/// Per-question time limits the quiz platform accepts, in seconds.
pub const TIME_OPTIONS: [u32; 8] = [5, 10, 20, 30, 60, 90, 120, 240];

/// Exact header row the platform's importer expects.
pub const CSV_HEADER: &str =
    "Question,Answer 1,Answer 2,Answer 3,Answer 4,Time limit (sec),Correct answer(s)";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExportError {
    #[error("invalid time limit {0}s (allowed: 5, 10, 20, 30, 60, 90, 120, 240)")]
    InvalidTimeLimit(u32),
}

/// One spreadsheet record in the platform's import layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub question: String,
    pub answers: [String; 4],
    pub time_limit_secs: u32,
    /// 1-based index of the correct answer.
    pub correct_answer: u8,
}

/// Project validated questions into export rows, 1:1 and order-preserving.
///
/// Input is assumed already validated; the only check here is that the
/// per-quiz time limit is one of [`TIME_OPTIONS`].
pub fn to_export_rows(
    questions: &[QuizQuestion],
    time_limit_secs: u32,
) -> Result<Vec<ExportRow>, ExportError> {
    if !TIME_OPTIONS.contains(&time_limit_secs) {
        return Err(ExportError::InvalidTimeLimit(time_limit_secs));
    }
    Ok(questions
        .iter()
        .map(|q| ExportRow {
            question: q.prompt.clone(),
            answers: q.options.clone(),
            time_limit_secs,
            correct_answer: q.correct_index,
        })
        .collect())
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Serialize export rows as the platform's CSV byte stream.
pub fn write_csv(rows: &[ExportRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_escape(&row.question),
            csv_escape(&row.answers[0]),
            csv_escape(&row.answers[1]),
            csv_escape(&row.answers[2]),
            csv_escape(&row.answers[3]),
            row.time_limit_secs,
            row.correct_answer,
        ));
    }
    out
}
