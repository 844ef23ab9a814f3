//! Anthropic Messages API request schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Request body for `POST {base}/v1/messages`.
///
/// Schema reference:
/// https://docs.anthropic.com/en/api/messages
///
/// Unlike the OpenAI shape, the system prompt is a top-level field and
/// `max_tokens` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessagesRequest {
    /// Anthropic docs: `string`, required.
    pub model: String,

    /// Anthropic docs: `integer`, required.
    pub max_tokens: u32,

    /// Anthropic docs: `string | array`, optional. Verdra always sends the
    /// plain-string form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Anthropic docs: `array`, required. User/assistant turns only; roles
    /// must alternate starting with `user`.
    pub messages: Vec<AnthropicMessage>,

    /// Anthropic docs: `number`, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// One conversation turn (string-content form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
}
