//! Client for the hosted image-captioning model.
//!
//! Captioning happens inside the synchronous extraction walk, so this
//! client uses reqwest's blocking API; callers on an async runtime run
//! the whole extraction in a blocking task.

use serde_json::Value;

use repaso_core::{CaptionError, ImageCaptioner};

pub struct HostedCaptioner {
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl HostedCaptioner {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, CaptionError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("repaso/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CaptionError::Request(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

impl ImageCaptioner for HostedCaptioner {
    fn describe(&self, image: &[u8]) -> Result<String, CaptionError> {
        let mut request = self.client.post(&self.url).body(image.to_vec());
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        let resp = request
            .send()
            .map_err(|e| CaptionError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(CaptionError::Request(format!("HTTP {}", resp.status())));
        }
        let body: Value = resp
            .json()
            .map_err(|e| CaptionError::BadResponse(e.to_string()))?;
        caption_from_response(&body)
    }
}

/// Pull the generated caption out of the model response.
///
/// The hosted endpoint replies `[{"generated_text": "..."}]`; some
/// deployments return the object without the array wrapper.
pub fn caption_from_response(body: &Value) -> Result<String, CaptionError> {
    let obj = match body {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| CaptionError::BadResponse("empty response array".into()))?,
        other => other,
    };
    obj.get("generated_text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CaptionError::BadResponse("missing generated_text".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_wrapped_caption_is_extracted() {
        let body = json!([{"generated_text": "un diagrama del ciclo del agua"}]);
        assert_eq!(
            caption_from_response(&body).unwrap(),
            "un diagrama del ciclo del agua"
        );
    }

    #[test]
    fn bare_object_caption_is_extracted() {
        let body = json!({"generated_text": "una célula vegetal"});
        assert_eq!(caption_from_response(&body).unwrap(), "una célula vegetal");
    }

    #[test]
    fn empty_array_is_a_bad_response() {
        let err = caption_from_response(&json!([])).unwrap_err();
        assert!(matches!(err, CaptionError::BadResponse(_)));
    }

    #[test]
    fn missing_field_is_a_bad_response() {
        let err = caption_from_response(&json!([{"label": "cat"}])).unwrap_err();
        assert!(matches!(err, CaptionError::BadResponse(_)));
    }
}
