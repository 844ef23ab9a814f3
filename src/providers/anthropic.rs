//! Anthropic Messages API backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use verdra_schema::anthropic::{
    AnthropicErrorBody, AnthropicMessage, AnthropicMessagesRequest, AnthropicMessagesResponse,
};

use crate::config::{ANTHROPIC_VERSION, AnthropicResolvedConfig};
use crate::error::ChatError;
use crate::providers::backend::{ChatBackend, ChatTurn, CompletionOutput, TokenUsage, TurnRole};
use crate::providers::policy::{ActionForError, MappingAction, classify_upstream_error};
use crate::providers::upstream_retry::post_json_with_retry;

pub const ANTHROPIC_PROVIDER: &str = "anthropic";

const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");
const ANTHROPIC_VERSION_HEADER: HeaderName = HeaderName::from_static("anthropic-version");

impl MappingAction for AnthropicErrorBody {
    fn try_match_rule(&self, status: StatusCode) -> Option<ActionForError> {
        match (status, self.inner.r#type.as_deref()) {
            (StatusCode::TOO_MANY_REQUESTS, Some("rate_limit_error")) => {
                Some(ActionForError::RateLimit(Duration::from_secs(60)))
            }
            // 529 is folded into retries upstream of classification; an
            // explicit overloaded body at another status still backs off.
            (_, Some("overloaded_error")) => {
                Some(ActionForError::RateLimit(Duration::from_secs(30)))
            }
            (StatusCode::UNAUTHORIZED, Some("authentication_error")) => {
                Some(ActionForError::Invalid)
            }
            (StatusCode::FORBIDDEN, Some("permission_error")) => Some(ActionForError::Disable),
            (StatusCode::NOT_FOUND, Some("not_found_error")) => {
                Some(ActionForError::ModelUnsupported)
            }
            _ => None,
        }
    }
}

pub struct AnthropicBackend {
    cfg: Arc<AnthropicResolvedConfig>,
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<HeaderValue>,
}

impl AnthropicBackend {
    pub fn new(cfg: Arc<AnthropicResolvedConfig>, client: reqwest::Client) -> Self {
        let endpoint = messages_endpoint(&cfg.base_url);
        let api_key = cfg.api_key.as_deref().map(|key| {
            let mut value =
                HeaderValue::from_str(key).expect("api key is not a valid header value");
            value.set_sensitive(true);
            value
        });
        Self {
            cfg,
            client,
            endpoint,
            api_key,
        }
    }

    fn build_request(&self, system: &str, turns: &[ChatTurn]) -> AnthropicMessagesRequest {
        // The Messages API requires alternating roles starting with `user`.
        // Persisted history already alternates; drop any leading assistant
        // turn left over from a trimmed window.
        let mut messages: Vec<AnthropicMessage> = Vec::with_capacity(turns.len());
        for turn in turns {
            if messages.is_empty() && turn.role == TurnRole::Assistant {
                continue;
            }
            messages.push(AnthropicMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }

        AnthropicMessagesRequest {
            model: self.cfg.model.clone(),
            max_tokens: self.cfg.max_tokens,
            system: Some(system.to_string()),
            messages,
            temperature: Some(self.cfg.temperature),
            extra: Default::default(),
        }
    }
}

#[async_trait]
impl ChatBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        ANTHROPIC_PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<CompletionOutput, ChatError> {
        let Some(api_key) = &self.api_key else {
            return Err(ChatError::EmptyCompletion {
                provider: ANTHROPIC_PROVIDER,
            });
        };

        let mut headers = HeaderMap::new();
        headers.insert(X_API_KEY, api_key.clone());
        headers.insert(
            ANTHROPIC_VERSION_HEADER,
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let body = self.build_request(system, turns);
        let resp = post_json_with_retry(
            ANTHROPIC_PROVIDER,
            &self.client,
            &self.endpoint,
            Some(headers),
            &body,
            self.cfg.retry_max_times,
        )
        .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let (action, err) = classify_upstream_error::<AnthropicErrorBody, _>(
                resp,
                |body| ChatError::Status {
                    provider: ANTHROPIC_PROVIDER,
                    status,
                    detail: body.inner.message.unwrap_or_default(),
                },
                |status, raw| ChatError::Status {
                    provider: ANTHROPIC_PROVIDER,
                    status,
                    detail: raw,
                },
            )
            .await;
            tracing::warn!(
                provider = ANTHROPIC_PROVIDER,
                ?action,
                "Chat completion failed"
            );
            return Err(err);
        }

        let bytes = resp.bytes().await?;
        let parsed: AnthropicMessagesResponse = serde_json::from_slice(&bytes)?;

        let text = parsed.joined_text();
        if text.trim().is_empty() {
            return Err(ChatError::EmptyCompletion {
                provider: ANTHROPIC_PROVIDER,
            });
        }

        Ok(CompletionOutput {
            text,
            model: if parsed.model.is_empty() {
                self.cfg.model.clone()
            } else {
                parsed.model
            },
            provider: ANTHROPIC_PROVIDER,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
        })
    }
}

fn messages_endpoint(base: &Url) -> Url {
    let joined = format!("{}/v1/messages", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).expect("invalid messages endpoint url")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_endpoint_appends_versioned_path() {
        let base = Url::parse("https://api.anthropic.com").unwrap();
        assert_eq!(
            messages_endpoint(&base).as_str(),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn try_match_rule_maps_typed_errors() {
        let raw = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        let parsed = serde_json::from_str::<AnthropicErrorBody>(raw).expect("parse sample");

        assert_eq!(
            parsed.try_match_rule(StatusCode::UNAUTHORIZED),
            Some(ActionForError::Invalid)
        );
        assert_eq!(parsed.try_match_rule(StatusCode::BAD_REQUEST), None);
    }

    #[test]
    fn leading_assistant_turn_is_dropped() {
        let cfg = Arc::new(crate::config::AnthropicConfig::default().resolve(&Default::default()));
        let backend = AnthropicBackend::new(cfg, reqwest::Client::new());

        let turns = vec![
            ChatTurn::assistant("stale reply"),
            ChatTurn::user("is my fern thirsty?"),
        ];
        let req = backend.build_request("sys", &turns);

        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
    }
}
