//! Anthropic upstream error envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `{"type": "error", "error": {"type": ..., "message": ...}}`
#[derive(Debug, Deserialize, Serialize)]
pub struct AnthropicErrorBody {
    #[serde(default)]
    pub r#type: String,

    #[serde(rename = "error")]
    #[serde(default)]
    pub inner: AnthropicErrorObject,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnthropicErrorObject {
    /// e.g. `rate_limit_error`, `authentication_error`, `not_found_error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn anthropic_error_body_parses_typed_error() {
        let body: AnthropicErrorBody = serde_json::from_value(json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "Too many requests"}
        }))
        .expect("failed to deserialize");

        assert_eq!(body.inner.r#type.as_deref(), Some("rate_limit_error"));
    }
}
