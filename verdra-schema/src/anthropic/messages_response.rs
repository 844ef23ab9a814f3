//! Anthropic Messages API response schema (non-streaming).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicMessagesResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<AnthropicUsage>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl AnthropicMessagesResponse {
    /// Concatenated text of all `text` content blocks.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.r#type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicContentBlock {
    #[serde(default)]
    pub r#type: String,

    #[serde(default)]
    pub text: String,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn anthropic_response_joins_text_blocks() {
        let resp: AnthropicMessagesResponse = serde_json::from_value(json!({
            "id": "msg_01",
            "model": "claude-3-5-haiku-latest",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Water "},
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "lightly."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 4}
        }))
        .expect("failed to deserialize");

        assert_eq!(resp.joined_text(), "Water lightly.");
        assert_eq!(resp.usage.map(|u| u.output_tokens), Some(4));
    }
}
