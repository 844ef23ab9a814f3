//! OpenAI-style upstream error envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `{"error": {...}}` envelope returned by OpenAI-compatible endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct OpenaiErrorBody {
    #[serde(rename = "error")]
    #[serde(default)]
    pub inner: OpenaiErrorObject,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenaiErrorObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Named `r#type` because `type` is a Rust keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Often a string or null; kept as `Value` in case upstream changes types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<Value>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn openai_error_body_parses_standard_shape() {
        let body: OpenaiErrorBody = serde_json::from_value(json!({
            "error": {
                "message": "Rate limit reached",
                "type": "tokens",
                "param": null,
                "code": "rate_limit_exceeded"
            }
        }))
        .expect("failed to deserialize");

        assert_eq!(body.inner.code.as_deref(), Some("rate_limit_exceeded"));
        assert_eq!(body.inner.r#type.as_deref(), Some("tokens"));
    }
}
