use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::config::CONFIG;
use crate::error::VerdraError;
use crate::server::respond;
use crate::server::router::VerdraState;

/// Unauthenticated liveness probe with a provider summary.
pub async fn health(State(state): State<VerdraState>) -> impl IntoResponse {
    respond::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.chat.configured_names(),
        "rule_engine": "ready",
    }))
}

/// Effective configuration with secrets redacted.
pub async fn effective_config(
    State(state): State<VerdraState>,
) -> Result<impl IntoResponse, VerdraError> {
    let cfg = &*CONFIG;

    Ok(respond::ok(json!({
        "basic": {
            "listen_addr": cfg.basic.listen_addr,
            "listen_port": cfg.basic.listen_port,
            "database_url": cfg.basic.database_url,
            "loglevel": cfg.basic.loglevel,
            "service_key": "<redacted>",
        },
        "providers": {
            "priority": state.providers.priority.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            "configured": state.providers.configured_names(),
            "openai": provider_summary(
                state.providers.openai_cfg.api_key.is_some(),
                state.providers.openai_cfg.base_url.as_str(),
                &state.providers.openai_cfg.model,
            ),
            "mistral": provider_summary(
                state.providers.mistral_cfg.api_key.is_some(),
                state.providers.mistral_cfg.base_url.as_str(),
                &state.providers.mistral_cfg.model,
            ),
            "anthropic": provider_summary(
                state.providers.anthropic_cfg.api_key.is_some(),
                state.providers.anthropic_cfg.base_url.as_str(),
                &state.providers.anthropic_cfg.model,
            ),
        },
        "care": {
            "assessment_cache_ttl_secs": cfg.care.assessment_cache_ttl_secs,
            "assessment_cache_capacity": cfg.care.assessment_cache_capacity,
            "warning_window": cfg.care.warning_window,
            "chat_rate_per_minute": cfg.care.chat_rate_per_minute,
        },
    })))
}

fn provider_summary(configured: bool, base_url: &str, model: &str) -> serde_json::Value {
    json!({
        "configured": configured,
        "base_url": base_url,
        "model": model,
        "api_key": if configured { "<redacted>" } else { "<unset>" },
    })
}
