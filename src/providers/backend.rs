use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One prior conversation turn handed to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A successful upstream completion, provider-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOutput {
    pub text: String,
    pub model: String,
    pub provider: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// A chat provider the failover chain can call.
///
/// `is_configured` gates participation: a backend without an API key is
/// skipped without being called.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    async fn complete(
        &self,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<CompletionOutput, ChatError>;
}
