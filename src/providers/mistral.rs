//! Mistral chat backend.
//!
//! Same wire format as OpenAI chat completions; only the base URL, default
//! model and error envelope differ.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use verdra_schema::mistral::MistralErrorBody;
use verdra_schema::openai::{ChatCompletionRequest, ChatCompletionResponse};

use crate::config::MistralResolvedConfig;
use crate::error::ChatError;
use crate::providers::backend::{ChatBackend, ChatTurn, CompletionOutput, TokenUsage};
use crate::providers::openai::{bearer_header, chat_completions_endpoint};
use crate::providers::policy::{ActionForError, MappingAction, classify_upstream_error};
use crate::providers::upstream_retry::post_json_with_retry;

pub const MISTRAL_PROVIDER: &str = "mistral";

impl MappingAction for MistralErrorBody {
    fn try_match_rule(&self, status: StatusCode) -> Option<ActionForError> {
        match (status, self.r#type.as_deref()) {
            (StatusCode::TOO_MANY_REQUESTS, _) => {
                Some(ActionForError::RateLimit(Duration::from_secs(60)))
            }
            (StatusCode::UNAUTHORIZED, _) => Some(ActionForError::Invalid),
            // Unknown model surfaces as a 400 validation error mentioning the field.
            (StatusCode::BAD_REQUEST, _)
                if self
                    .message_text()
                    .is_some_and(|m| m.to_ascii_lowercase().contains("model")) =>
            {
                Some(ActionForError::ModelUnsupported)
            }
            _ => None,
        }
    }
}

pub struct MistralBackend {
    cfg: Arc<MistralResolvedConfig>,
    client: reqwest::Client,
    endpoint: Url,
    auth: Option<HeaderValue>,
}

impl MistralBackend {
    pub fn new(cfg: Arc<MistralResolvedConfig>, client: reqwest::Client) -> Self {
        let endpoint = chat_completions_endpoint(&cfg.base_url);
        let auth = cfg.api_key.as_deref().map(bearer_header);
        Self {
            cfg,
            client,
            endpoint,
            auth,
        }
    }

    fn build_request(&self, system: &str, turns: &[ChatTurn]) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(verdra_schema::ChatMessage::system(system));
        for turn in turns {
            messages.push(verdra_schema::ChatMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }

        ChatCompletionRequest {
            model: self.cfg.model.clone(),
            messages,
            max_tokens: Some(self.cfg.max_tokens),
            temperature: Some(self.cfg.temperature),
            top_p: None,
            stream: false,
            extra: Default::default(),
        }
    }
}

#[async_trait]
impl ChatBackend for MistralBackend {
    fn name(&self) -> &'static str {
        MISTRAL_PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.auth.is_some()
    }

    async fn complete(
        &self,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<CompletionOutput, ChatError> {
        let Some(auth) = &self.auth else {
            return Err(ChatError::EmptyCompletion {
                provider: MISTRAL_PROVIDER,
            });
        };

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth.clone());

        let body = self.build_request(system, turns);
        let resp = post_json_with_retry(
            MISTRAL_PROVIDER,
            &self.client,
            &self.endpoint,
            Some(headers),
            &body,
            self.cfg.retry_max_times,
        )
        .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let (action, err) = classify_upstream_error::<MistralErrorBody, _>(
                resp,
                |body| ChatError::Status {
                    provider: MISTRAL_PROVIDER,
                    status,
                    detail: body.message_text().unwrap_or_default(),
                },
                |status, raw| ChatError::Status {
                    provider: MISTRAL_PROVIDER,
                    status,
                    detail: raw,
                },
            )
            .await;
            tracing::warn!(provider = MISTRAL_PROVIDER, ?action, "Chat completion failed");
            return Err(err);
        }

        let bytes = resp.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)?;

        let text = parsed
            .first_text()
            .map(str::to_string)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ChatError::EmptyCompletion {
                provider: MISTRAL_PROVIDER,
            })?;

        Ok(CompletionOutput {
            text,
            model: if parsed.model.is_empty() {
                self.cfg.model.clone()
            } else {
                parsed.model
            },
            provider: MISTRAL_PROVIDER,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }
}
