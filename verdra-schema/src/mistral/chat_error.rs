use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mistral upstream error response schema.
///
/// Mistral returns a flat object (`{"object":"error", "message": ..., ...}`)
/// instead of the OpenAI `{"error": {...}}` envelope.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MistralErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    /// Sometimes a plain string, sometimes a validation-detail object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl MistralErrorBody {
    /// Human-readable message regardless of which shape `message` took.
    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mistral_error_body_parses_flat_shape() {
        let body: MistralErrorBody = serde_json::from_value(json!({
            "object": "error",
            "message": "Unauthorized",
            "type": "invalid_request_error",
            "param": null,
            "code": 1000
        }))
        .expect("failed to deserialize");

        assert_eq!(body.object.as_deref(), Some("error"));
        assert_eq!(body.message_text().as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn mistral_error_body_stringifies_structured_message() {
        let body: MistralErrorBody = serde_json::from_value(json!({
            "object": "error",
            "message": {"detail": [{"loc": ["body", "model"], "msg": "field required"}]}
        }))
        .expect("failed to deserialize");

        let text = body.message_text().expect("missing message");
        assert!(text.contains("field required"));
    }
}
