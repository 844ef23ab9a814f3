//! OpenAI Chat Completions request schema.
//!
//! Mistral's chat endpoint (`POST /v1/chat/completions`) is wire-compatible with
//! this shape, so the mistral backend reuses these types with its own base URL
//! and error body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Request body for `POST {base}/chat/completions`.
///
/// Schema reference:
/// https://platform.openai.com/docs/api-reference/chat/create
///
/// Only the fields verdra actually sends are typed; `extra` carries anything
/// else through untouched so the struct survives upstream schema additions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// OpenAI docs: `string`, required.
    pub model: String,

    /// OpenAI docs: `array`, required. Ordered conversation, system first.
    pub messages: Vec<ChatMessage>,

    /// OpenAI docs: `integer`, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// OpenAI docs: `number`, optional, default `1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// OpenAI docs: `number`, optional, default `1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// OpenAI docs: `boolean`, optional, default `false`. Verdra never streams
    /// chat completions; the field is kept explicit so the serialized request
    /// states it.
    #[serde(default)]
    pub stream: bool,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_serializes_minimal_form() {
        let req = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            max_tokens: Some(512),
            temperature: Some(0.7),
            top_p: None,
            stream: false,
            extra: BTreeMap::new(),
        };

        let out = serde_json::to_value(&req).expect("failed to serialize");
        assert_eq!(out["model"], json!("gpt-4o-mini"));
        assert_eq!(out["messages"][0]["role"], json!("system"));
        assert_eq!(out["messages"][1]["content"], json!("hi"));
        assert_eq!(out["stream"], json!(false));
        assert!(out.get("top_p").is_none());
    }

    #[test]
    fn chat_request_roundtrips_unknown_fields() {
        let req: ChatCompletionRequest = serde_json::from_value(json!({
            "model": "mistral-small-latest",
            "messages": [{"role": "user", "content": "hi"}],
            "safe_prompt": true,
        }))
        .expect("failed to deserialize");

        assert_eq!(req.extra.get("safe_prompt"), Some(&json!(true)));
        let out = serde_json::to_value(&req).expect("failed to serialize");
        assert_eq!(out["safe_prompt"], json!(true));
    }
}
