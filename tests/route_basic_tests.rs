use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

fn temp_db_path(tag: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!("verdra-{tag}-{}-{}.sqlite", std::process::id(), nanos));
    temp_path
}

#[tokio::test]
async fn router_enforces_auth_validation_and_not_found() {
    let temp_path = temp_db_path("basic");
    let database_url = format!("sqlite:{}", temp_path.display());
    let db = verdra::db::spawn(&database_url).await;

    let mut cfg = verdra::config::Config::default();
    cfg.basic.service_key = "pwd".to_string();
    // No chat providers: keeps every test path offline.
    cfg.providers.priority = Vec::new();

    let providers = verdra::providers::Providers::from_config(&cfg);
    let state = verdra::server::router::VerdraState::new(providers, db, &cfg);
    let app = verdra::server::router::verdra_router(state);

    // 1) /health is unauthenticated -> 200
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body_str.contains("\"success\":true"));
    assert!(body_str.contains("\"status\":\"ok\""));

    // 2) /v1 route without key -> 401
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/plants")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 3) wrong key -> 401
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/plants")
                .header("x-api-key", "nope")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 4) bearer token works too -> 200 with empty plant list
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/plants")
                .header("authorization", "Bearer pwd")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body_str.contains("\"data\":[]"));

    // 5) invalid JSON -> 400
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/plants")
                .header("content-type", "application/json")
                .header("x-api-key", "pwd")
                .body(Body::from("not-json"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 6) empty name -> 400 with a VALIDATION_ERROR envelope
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/plants")
                .header("content-type", "application/json")
                .header("x-api-key", "pwd")
                .body(Body::from(r#"{"name": "  "}"#))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body_str.contains("\"success\":false"));
    assert!(body_str.contains("VALIDATION_ERROR"));

    // 7) unknown soil -> 400
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/plants")
                .header("content-type", "application/json")
                .header("x-api-key", "pwd")
                .body(Body::from(r#"{"name": "Fern", "soil": "gravel"}"#))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 8) unknown plant -> 404 with typed code
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/plants/42")
                .header("x-api-key", "pwd")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body_str.contains("PLANT_NOT_FOUND"));

    // 9) unknown route -> 404
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/telemetry")
                .header("x-api-key", "pwd")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 10) /v1/service/config redacts the service key
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/service/config")
                .header("x-api-key", "pwd")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body_str = std::str::from_utf8(&body).expect("response body was not utf-8");
    assert!(body_str.contains("<redacted>"));
    assert!(!body_str.contains("pwd"));

    let _ = fs::remove_file(&temp_path);
}
