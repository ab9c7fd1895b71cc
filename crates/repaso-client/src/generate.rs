//! Client for the hosted quiz-generation space.

use serde_json::{Value, json};

use repaso_core::Language;

use crate::ClientError;

pub struct QuizGenerator {
    client: reqwest::Client,
    url: String,
}

impl QuizGenerator {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("repaso/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Ask the hosted model for quiz questions over the corpus.
    ///
    /// Returns the model's raw reply text, which still has to pass
    /// validation before export.
    pub async fn generate(
        &self,
        corpus: &str,
        count: u32,
        time_limit_secs: u32,
        language: Language,
    ) -> Result<String, ClientError> {
        let payload = json!({
            "data": [corpus, count, time_limit_secs, language.as_str()]
        });
        tracing::info!(count, time_limit_secs, language = language.as_str(), "requesting quiz");
        let resp = self.client.post(&self.url).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status("generator", resp.status().as_u16()));
        }
        let body: Value = resp.json().await?;
        let data = body
            .get("data")
            .ok_or_else(|| ClientError::BadResponse("missing data field".into()))?;
        Ok(payload_text(data))
    }
}

/// The generator wraps its reply in `{"data": ...}`. The inner value is
/// usually a string, sometimes a one-element array of strings; anything
/// else is passed through serialized so validation can report on it.
pub fn payload_text(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        Value::Array(items) => match items.as_slice() {
            [Value::String(s)] => s.clone(),
            _ => data.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_payload_passes_through() {
        assert_eq!(payload_text(&json!("[]")), "[]");
    }

    #[test]
    fn single_element_array_unwraps() {
        assert_eq!(payload_text(&json!(["respuesta"])), "respuesta");
    }

    #[test]
    fn structured_payload_is_serialized() {
        let data = json!([{"question": "¿Qué es un átomo?"}]);
        let text = payload_text(&data);
        assert!(text.contains("¿Qué es un átomo?"));
        assert!(serde_json::from_str::<Value>(&text).is_ok());
    }

    #[test]
    fn multi_string_array_stays_json() {
        let text = payload_text(&json!(["a", "b"]));
        assert_eq!(text, r#"["a","b"]"#);
    }
}
