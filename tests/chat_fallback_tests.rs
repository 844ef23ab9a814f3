use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not json")
}

fn post_json(uri: &str, key: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", key)
        .body(Body::from(body))
        .expect("failed to build request")
}

#[tokio::test]
async fn chat_answers_rule_based_when_no_provider_is_configured() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "verdra-chat-fallback-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let db = verdra::db::spawn(&database_url).await;

    let mut cfg = verdra::config::Config::default();
    cfg.basic.service_key = "pwd".to_string();
    // Empty chain: every chat request must take the rule-based path.
    cfg.providers.priority = Vec::new();

    let providers = verdra::providers::Providers::from_config(&cfg);
    let state = verdra::server::router::VerdraState::new(providers, db, &cfg);
    let app = verdra::server::router::verdra_router(state);

    // 1) setup: plant + dry reading
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/plants",
            "pwd",
            r#"{"name": "Office fern", "species": "fern"}"#.to_string(),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let plant_id = body_json(resp).await["data"]["id"]
        .as_i64()
        .expect("missing plant id");

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/readings"),
            "pwd",
            r#"{"soil_moisture": 18.0, "temperature": 22.0, "humidity": 55.0, "light_level": 40.0}"#
                .to_string(),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // 2) empty message -> 400
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/chat/message",
            "pwd",
            format!(r#"{{"message": "   ", "plant_id": {plant_id}}}"#),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 3) unknown plant -> 404
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/chat/message",
            "pwd",
            r#"{"message": "hello", "plant_id": 404}"#.to_string(),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 4) watering question -> rule-based watering advice
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/chat/message",
            "pwd",
            format!(r#"{{"message": "Should I water my fern?", "plant_id": {plant_id}}}"#),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["source"], "rule-based");
    let session_id = body["data"]["session_id"]
        .as_str()
        .expect("missing session id")
        .to_string();
    let reply = body["data"]["reply"].as_str().expect("missing reply");
    // 18% moisture is below the fern critical threshold.
    assert!(reply.contains("Water immediately"));

    // 5) follow-up in the same session reuses the session id
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/chat/message",
            "pwd",
            format!(
                r#"{{"message": "How healthy is it overall?", "plant_id": {plant_id}, "session_id": "{session_id}"}}"#
            ),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["session_id"], session_id.as_str());
    assert!(
        body["data"]["reply"]
            .as_str()
            .expect("missing reply")
            .contains("/100")
    );

    // 6) transcript holds all four turns, oldest first
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/v1/chat/history/{session_id}"))
                .header("x-api-key", "pwd")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let turns = body["data"].as_array().expect("history array");
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[1]["role"], "assistant");
    assert_eq!(turns[1]["source"], "rule-based");
    assert!(
        turns[0]["content"]
            .as_str()
            .expect("content")
            .contains("Should I water")
    );

    let _ = fs::remove_file(&temp_path);
}
