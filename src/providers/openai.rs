//! OpenAI chat backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use verdra_schema::openai::{ChatCompletionRequest, ChatCompletionResponse, OpenaiErrorBody};

use crate::config::OpenaiResolvedConfig;
use crate::error::ChatError;
use crate::providers::backend::{ChatBackend, ChatTurn, CompletionOutput, TokenUsage};
use crate::providers::policy::{ActionForError, MappingAction, classify_upstream_error};
use crate::providers::upstream_retry::post_json_with_retry;

pub const OPENAI_PROVIDER: &str = "openai";

impl MappingAction for OpenaiErrorBody {
    fn try_match_rule(&self, status: StatusCode) -> Option<ActionForError> {
        match (status, self.inner.code.as_deref()) {
            (StatusCode::TOO_MANY_REQUESTS, Some("rate_limit_exceeded")) => {
                Some(ActionForError::RateLimit(Duration::from_secs(60)))
            }
            // Out of credit: retrying other providers is the only option.
            (StatusCode::TOO_MANY_REQUESTS, Some("insufficient_quota")) => {
                Some(ActionForError::Disable)
            }
            (StatusCode::UNAUTHORIZED, Some("invalid_api_key")) => Some(ActionForError::Invalid),
            (StatusCode::NOT_FOUND, Some("model_not_found")) => {
                Some(ActionForError::ModelUnsupported)
            }
            _ => None,
        }
    }
}

pub struct OpenaiBackend {
    cfg: Arc<OpenaiResolvedConfig>,
    client: reqwest::Client,
    endpoint: Url,
    auth: Option<HeaderValue>,
}

impl OpenaiBackend {
    pub fn new(cfg: Arc<OpenaiResolvedConfig>, client: reqwest::Client) -> Self {
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
impl ChatBackend for OpenaiBackend {
    fn name(&self) -> &'static str {
        OPENAI_PROVIDER
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
                provider: OPENAI_PROVIDER,
            });
        };

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth.clone());

        let body = self.build_request(system, turns);
        let resp = post_json_with_retry(
            OPENAI_PROVIDER,
            &self.client,
            &self.endpoint,
            Some(headers),
            &body,
            self.cfg.retry_max_times,
        )
        .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let (action, err) = classify_upstream_error::<OpenaiErrorBody, _>(
                resp,
                |body| ChatError::Status {
                    provider: OPENAI_PROVIDER,
                    status,
                    detail: body.inner.message.unwrap_or_default(),
                },
                |status, raw| ChatError::Status {
                    provider: OPENAI_PROVIDER,
                    status,
                    detail: raw,
                },
            )
            .await;
            tracing::warn!(provider = OPENAI_PROVIDER, ?action, "Chat completion failed");
            return Err(err);
        }

        let bytes = resp.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)?;

        let text = parsed
            .first_text()
            .map(str::to_string)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ChatError::EmptyCompletion {
                provider: OPENAI_PROVIDER,
            })?;

        Ok(CompletionOutput {
            text,
            model: if parsed.model.is_empty() {
                self.cfg.model.clone()
            } else {
                parsed.model
            },
            provider: OPENAI_PROVIDER,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }
}

/// Appends `chat/completions` without clobbering a versioned base path.
pub(crate) fn chat_completions_endpoint(base: &Url) -> Url {
    let joined = format!(
        "{}/chat/completions",
        base.as_str().trim_end_matches('/')
    );
    Url::parse(&joined).expect("invalid chat completions endpoint url")
}

pub(crate) fn bearer_header(key: &str) -> HeaderValue {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {key}")).expect("api key is not a valid header value");
    value.set_sensitive(true);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_preserves_versioned_base_path() {
        let base = Url::parse("https://api.openai.com/v1").unwrap();
        assert_eq!(
            chat_completions_endpoint(&base).as_str(),
            "https://api.openai.com/v1/chat/completions"
        );

        let trailing = Url::parse("https://api.openai.com/v1/").unwrap();
        assert_eq!(
            chat_completions_endpoint(&trailing).as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn try_match_rule_maps_known_codes() {
        let raw = r#"{"error":{"code":"insufficient_quota","message":"You exceeded your current quota"}}"#;
        let parsed = serde_json::from_str::<OpenaiErrorBody>(raw).expect("parse sample");

        assert_eq!(
            parsed.try_match_rule(StatusCode::TOO_MANY_REQUESTS),
            Some(ActionForError::Disable)
        );
        // Known code under an unexpected status falls back to status mapping.
        assert_eq!(parsed.try_match_rule(StatusCode::BAD_REQUEST), None);
    }

    #[test]
    fn action_from_status_covers_common_statuses() {
        assert_eq!(
            OpenaiErrorBody::action_from_status(StatusCode::UNAUTHORIZED),
            ActionForError::Invalid
        );
        assert_eq!(
            OpenaiErrorBody::action_from_status(StatusCode::NOT_FOUND),
            ActionForError::ModelUnsupported
        );
        assert_eq!(
            OpenaiErrorBody::action_from_status(StatusCode::BAD_REQUEST),
            ActionForError::None
        );
    }
}
