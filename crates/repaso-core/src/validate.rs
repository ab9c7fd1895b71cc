//! Validation of raw question-generator output.
//!
//! The hosted generator returns loosely-structured JSON (sometimes wrapped
//! in a markdown code fence). Every field is untrusted until it is proven
//! into a strict [`QuizQuestion`]; unproven input never crosses this
//! boundary. Per-item defects are collected as rejections and the rest of
//! the payload is still accepted — partial success is the normal case.

use serde_json::Value;
use thiserror::Error;

use crate::QuizQuestion;

/// Quiz-platform cap on question text length. Advisory at this layer.
pub const PROMPT_MAX_CHARS: usize = 120;
/// Quiz-platform cap on answer text length. Advisory at this layer.
pub const OPTION_MAX_CHARS: usize = 75;

/// Wholesale validation failure: the generator broke its contract and
/// nothing in the payload can be salvaged.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("generator response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("generator response is not a JSON array")]
    NotAnArray,
}

/// Why one element of the response array was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotAnObject,
    /// Field missing or not of the expected type.
    MissingField(&'static str),
    BadOptionCount(usize),
    BadCorrectIndex(i64),
}

impl RejectReason {
    /// Stable machine-readable code for logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::NotAnObject => "not_an_object",
            RejectReason::MissingField(_) => "missing_field",
            RejectReason::BadOptionCount(_) => "bad_option_count",
            RejectReason::BadCorrectIndex(_) => "bad_correct_index",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NotAnObject => write!(f, "element is not a JSON object"),
            RejectReason::MissingField(field) => {
                write!(f, "field `{}` is missing or has the wrong type", field)
            }
            RejectReason::BadOptionCount(n) => {
                write!(f, "expected exactly 4 options, got {}", n)
            }
            RejectReason::BadCorrectIndex(i) => {
                write!(f, "correctIndex {} is outside [1, 4]", i)
            }
        }
    }
}

/// One rejected element, by position in the response array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}

/// Which field of an accepted question exceeds the platform length cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    Prompt,
    /// 1-based option position.
    Option(usize),
}

impl std::fmt::Display for LengthField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthField::Prompt => write!(f, "prompt"),
            LengthField::Option(n) => write!(f, "option {}", n),
        }
    }
}

/// An accepted question whose text exceeds the platform cap. The upstream
/// generator is supposed to enforce these but cannot be trusted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthWarning {
    /// Index into the *accepted* question list.
    pub index: usize,
    pub field: LengthField,
    pub chars: usize,
    pub max: usize,
}

/// Outcome of validating one generator response.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub accepted: Vec<QuizQuestion>,
    pub rejections: Vec<Rejection>,
    pub length_warnings: Vec<LengthWarning>,
}

/// Strip a leading/trailing markdown code fence (``` or ```json) that
/// text-generation services commonly wrap JSON output in.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the rest of the fence line (e.g. a "json" language tag). A
    // single-line fence has no newline, just an optional tag.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn check_element(element: &Value) -> Result<QuizQuestion, RejectReason> {
    let obj = element.as_object().ok_or(RejectReason::NotAnObject)?;

    let prompt = obj
        .get("prompt")
        .and_then(Value::as_str)
        .ok_or(RejectReason::MissingField("prompt"))?;

    let options = obj
        .get("options")
        .and_then(Value::as_array)
        .ok_or(RejectReason::MissingField("options"))?;
    if options.len() != 4 {
        return Err(RejectReason::BadOptionCount(options.len()));
    }
    let mut texts: [String; 4] = Default::default();
    for (slot, option) in texts.iter_mut().zip(options) {
        *slot = option
            .as_str()
            .ok_or(RejectReason::MissingField("options"))?
            .to_string();
    }

    let correct = obj
        .get("correctIndex")
        .and_then(Value::as_i64)
        .ok_or(RejectReason::MissingField("correctIndex"))?;
    if !(1..=4).contains(&correct) {
        return Err(RejectReason::BadCorrectIndex(correct));
    }

    Ok(QuizQuestion {
        prompt: prompt.to_string(),
        options: texts,
        correct_index: correct as u8,
    })
}

fn flag_lengths(index: usize, question: &QuizQuestion, warnings: &mut Vec<LengthWarning>) {
    let prompt_chars = question.prompt.chars().count();
    if prompt_chars > PROMPT_MAX_CHARS {
        warnings.push(LengthWarning {
            index,
            field: LengthField::Prompt,
            chars: prompt_chars,
            max: PROMPT_MAX_CHARS,
        });
    }
    for (i, option) in question.options.iter().enumerate() {
        let chars = option.chars().count();
        if chars > OPTION_MAX_CHARS {
            warnings.push(LengthWarning {
                index,
                field: LengthField::Option(i + 1),
                chars,
                max: OPTION_MAX_CHARS,
            });
        }
    }
}

/// Validate a raw generator response into export-ready questions.
///
/// A non-array top level (or unparsable JSON, after fence stripping) fails
/// wholesale — that means the upstream generation call itself broke its
/// contract. Per-element defects only reject that element.
pub fn validate_response(raw: &str) -> Result<ValidationReport, ResponseError> {
    let payload: Value = serde_json::from_str(strip_code_fence(raw))?;
    let elements = payload.as_array().ok_or(ResponseError::NotAnArray)?;

    let mut report = ValidationReport::default();
    for (index, element) in elements.iter().enumerate() {
        match check_element(element) {
            Ok(question) => {
                flag_lengths(report.accepted.len(), &question, &mut report.length_warnings);
                report.accepted.push(question);
            }
            Err(reason) => {
                tracing::debug!(index, code = reason.code(), "rejected generated question");
                report.rejections.push(Rejection { index, reason });
            }
        }
    }
    Ok(report)
}
