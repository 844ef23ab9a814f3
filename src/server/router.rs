use crate::care::AssessmentCache;
use crate::config::Config;
use crate::db::DbActorHandle;
use crate::providers::anthropic::AnthropicBackend;
use crate::providers::mistral::MistralBackend;
use crate::providers::openai::OpenaiBackend;
use crate::providers::{ChatBackend, ChatRouter, ProviderKind, Providers};
use crate::server::guards::auth::RequireKeyAuth;
use crate::server::routes::{alerts, care, chat, plants, sensors, service};

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use base64::Engine as _;
use governor::{Quota, RateLimiter};
use rand::RngCore;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::num::NonZeroU32;
use std::time::Instant;
use std::{sync::Arc, time::Duration};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Inbound request bodies larger than this are rejected before handlers run.
const MAX_BODY_BYTES: usize = 256 * 1024;

const USER_AGENT_STRING: &str = concat!("verdra/", env!("CARGO_PKG_VERSION"));

type DirectLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct VerdraState {
    pub db: DbActorHandle,
    pub providers: Providers,
    pub chat: ChatRouter,
    pub assessments: AssessmentCache,
    pub service_key: Arc<str>,
    pub chat_limiter: Arc<DirectLimiter>,
    pub warning_window: u32,
}

impl VerdraState {
    pub fn new(providers: Providers, db: DbActorHandle, cfg: &Config) -> Self {
        fn build_client(proxy: Option<url::Url>, enable_multiplexing: bool) -> reqwest::Client {
            let mut headers = HeaderMap::new();

            let mut builder = reqwest::Client::builder()
                .user_agent(USER_AGENT_STRING)
                .redirect(reqwest::redirect::Policy::none())
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(2 * 60));

            if let Some(proxy_url) = proxy {
                let proxy = reqwest::Proxy::all(proxy_url.as_str())
                    .expect("invalid proxy url for reqwest client");
                builder = builder.proxy(proxy);
            }

            if !enable_multiplexing {
                headers.insert(CONNECTION, HeaderValue::from_static("close"));

                builder = builder
                    .http1_only()
                    .pool_max_idle_per_host(0)
                    .pool_idle_timeout(Duration::from_secs(0));
            } else {
                builder = builder.http2_adaptive_window(true);
            }

            builder
                .default_headers(headers)
                .build()
                .expect("failed to build reqwest client")
        }

        let openai_client = build_client(
            providers.openai_cfg.proxy.clone(),
            providers.openai_cfg.enable_multiplexing,
        );
        let mistral_client = build_client(
            providers.mistral_cfg.proxy.clone(),
            providers.mistral_cfg.enable_multiplexing,
        );
        let anthropic_client = build_client(
            providers.anthropic_cfg.proxy.clone(),
            providers.anthropic_cfg.enable_multiplexing,
        );

        let backends: Vec<Arc<dyn ChatBackend>> = providers
            .priority
            .iter()
            .map(|kind| match kind {
                ProviderKind::Openai => Arc::new(OpenaiBackend::new(
                    providers.openai_cfg.clone(),
                    openai_client.clone(),
                )) as Arc<dyn ChatBackend>,
                ProviderKind::Mistral => Arc::new(MistralBackend::new(
                    providers.mistral_cfg.clone(),
                    mistral_client.clone(),
                )),
                ProviderKind::Anthropic => Arc::new(AnthropicBackend::new(
                    providers.anthropic_cfg.clone(),
                    anthropic_client.clone(),
                )),
            })
            .collect();

        let chat_rate = NonZeroU32::new(cfg.care.chat_rate_per_minute.max(1))
            .expect("chat rate is clamped to at least 1");

        Self {
            db,
            providers,
            chat: ChatRouter::new(backends),
            assessments: AssessmentCache::new(
                Duration::from_secs(cfg.care.assessment_cache_ttl_secs),
                cfg.care.assessment_cache_capacity,
            ),
            service_key: Arc::from(cfg.basic.service_key.as_str()),
            chat_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(chat_rate))),
            warning_window: cfg.care.warning_window,
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id` for easier correlation, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

pub fn verdra_router(state: VerdraState) -> Router {
    let api = Router::new()
        .route("/v1/plants", post(plants::create_plant).get(plants::list_plants))
        .route("/v1/plants/{id}", get(plants::get_plant))
        .route("/v1/plants/{id}/readings", post(sensors::ingest_reading))
        .route(
            "/v1/plants/{id}/readings/latest",
            get(sensors::latest_reading),
        )
        .route(
            "/v1/plants/{id}/watering",
            post(sensors::log_watering).get(sensors::recent_waterings),
        )
        .route(
            "/v1/plants/{id}/watering/predict",
            post(care::predict_watering),
        )
        .route("/v1/plants/{id}/health/analyze", post(care::analyze_health))
        .route("/v1/plants/{id}/assessments", get(care::assessment_history))
        .route(
            "/v1/plants/{id}/warnings/evaluate",
            post(alerts::evaluate_warnings),
        )
        .route("/v1/plants/{id}/alerts", get(alerts::open_alerts))
        .route("/v1/alerts/{id}/acknowledge", post(alerts::acknowledge_alert))
        .route("/v1/chat/message", post(chat::post_message))
        .route("/v1/chat/history/{session_id}", get(chat::session_history))
        .route("/v1/service/config", get(service::effective_config))
        .layer(middleware::from_extractor_with_state::<RequireKeyAuth, _>(
            state.clone(),
        ));

    Router::new()
        .route("/health", get(service::health))
        .merge(api)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn(access_log))
}
