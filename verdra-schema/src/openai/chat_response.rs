//! OpenAI Chat Completions response schema (non-streaming).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response body for a non-streaming chat completion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the upstream returned one.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,

    pub message: ChatChoiceMessage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub role: String,

    /// Upstream may send `content: null` for tool-call turns; verdra never
    /// requests tools, so null collapses to empty.
    #[serde(default, deserialize_with = "deserialize_nullable_content")]
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

fn deserialize_nullable_content<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_response_extracts_first_text() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "water it"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }))
        .expect("failed to deserialize");

        assert_eq!(resp.first_text(), Some("water it"));
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(15));
    }

    #[test]
    fn chat_response_tolerates_null_content_and_no_choices() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .expect("failed to deserialize");
        assert_eq!(resp.first_text(), Some(""));

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({})).expect("failed to deserialize");
        assert_eq!(empty.first_text(), None);
    }
}
