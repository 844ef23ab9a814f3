use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use crate::chat::{RULE_BASED_SOURCE, build_system_prompt, compose_fallback_reply};
use crate::db::ChatMessageCreate;
use crate::error::VerdraError;
use crate::providers::{ChatTurn, TokenUsage};
use crate::server::respond;
use crate::server::router::VerdraState;
use crate::server::routes::plants::fetch_plant;

/// Longest accepted user message, in characters.
const MAX_MESSAGE_CHARS: usize = 2000;
/// Turns of session history sent upstream.
const HISTORY_TURNS: i64 = 5;
/// Watering events embedded in the system prompt.
const WATERING_CONTEXT: i64 = 3;

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
    pub plant_id: i64,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub reply: String,
    pub session_id: String,
    /// Provider name, or `rule-based` when the chain was exhausted.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub processing_ms: u64,
}

pub async fn post_message(
    State(state): State<VerdraState>,
    Json(req): Json<ChatMessageRequest>,
) -> Result<impl IntoResponse, VerdraError> {
    let started = Instant::now();

    let message = req.message.trim();
    if message.is_empty() {
        return Err(VerdraError::validation("message", "must be non-empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(VerdraError::validation(
            "message",
            format!("must be at most {MAX_MESSAGE_CHARS} characters"),
        ));
    }

    if state.chat_limiter.check().is_err() {
        return Err(VerdraError::RateLimited);
    }

    let plant = fetch_plant(&state, req.plant_id).await?;
    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let latest = state.db.latest_reading(req.plant_id).await?;
    let latest_reading = latest.as_ref().map(|r| r.to_reading());
    let waterings = state
        .db
        .recent_waterings(req.plant_id, WATERING_CONTEXT)
        .await?;

    // Newest-first from the store; providers want oldest-first.
    let mut history = state
        .db
        .session_history(session_id.clone(), HISTORY_TURNS)
        .await?;
    history.reverse();

    let mut turns: Vec<ChatTurn> = history
        .iter()
        .filter_map(|record| match record.role.as_str() {
            "user" => Some(ChatTurn::user(record.content.clone())),
            "assistant" => Some(ChatTurn::assistant(record.content.clone())),
            _ => None,
        })
        .collect();
    turns.push(ChatTurn::user(message.to_string()));

    let system = build_system_prompt(&plant, latest_reading.as_ref(), &waterings);

    let (reply, source, model, usage) = match state.chat.complete(&system, &turns).await {
        Some(output) => (
            output.text,
            output.provider.to_string(),
            Some(output.model),
            output.usage,
        ),
        None => (
            compose_fallback_reply(message, &plant, latest_reading.as_ref()),
            RULE_BASED_SOURCE.to_string(),
            None,
            None,
        ),
    };

    state
        .db
        .append_chat_message(ChatMessageCreate {
            session_id: session_id.clone(),
            plant_id: Some(req.plant_id),
            role: "user".to_string(),
            content: message.to_string(),
            source: None,
        })
        .await?;
    state
        .db
        .append_chat_message(ChatMessageCreate {
            session_id: session_id.clone(),
            plant_id: Some(req.plant_id),
            role: "assistant".to_string(),
            content: reply.clone(),
            source: Some(source.clone()),
        })
        .await?;

    Ok(respond::ok(ChatMessageResponse {
        reply,
        session_id,
        source,
        model,
        usage,
        processing_ms: started.elapsed().as_millis() as u64,
    }))
}

pub async fn session_history(
    State(state): State<VerdraState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, VerdraError> {
    let mut messages = state.db.session_history(session_id, 100).await?;
    // Stored newest-first; clients read transcripts oldest-first.
    messages.reverse();
    Ok(respond::ok(messages))
}
