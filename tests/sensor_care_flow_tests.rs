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

fn post_json(uri: &str, key: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", key)
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn get(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", key)
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn reading_ingest_feeds_watering_and_health_assessments() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "verdra-care-flow-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let db = verdra::db::spawn(&database_url).await;

    let mut cfg = verdra::config::Config::default();
    cfg.basic.service_key = "pwd".to_string();
    cfg.providers.priority = Vec::new();

    let providers = verdra::providers::Providers::from_config(&cfg);
    let state = verdra::server::router::VerdraState::new(providers, db, &cfg);
    let app = verdra::server::router::verdra_router(state);

    // 1) register a tomato in loam
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/plants",
            "pwd",
            r#"{"name": "Balcony tomato", "species": "tomato", "soil": "loam"}"#,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let plant_id = body["data"]["id"].as_i64().expect("missing plant id");
    assert_eq!(body["data"]["species"], "tomato");

    // 2) out-of-range reading -> 400
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/readings"),
            "pwd",
            r#"{"soil_moisture": 130.0, "temperature": 24.0, "humidity": 50.0, "light_level": 60.0}"#,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 3) predict before any reading exists -> 404 NO_SENSOR_DATA
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/watering/predict"),
            "pwd",
            "{}",
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 4) ingest a dry reading
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/readings"),
            "pwd",
            r#"{"soil_moisture": 15.0, "temperature": 31.0, "humidity": 35.0, "light_level": 80.0, "soil_ph": 6.5}"#,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // 5) latest reading echoes the stored values
    let resp = app
        .clone()
        .oneshot(get(
            &format!("/v1/plants/{plant_id}/readings/latest"),
            "pwd",
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["soil_moisture"], 15.0);
    assert_eq!(body["data"]["soil_ph"], 6.5);

    // 6) watering prediction: tomato at 15% moisture is critically dry
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/watering/predict"),
            "pwd",
            "{}",
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["needs_watering"], true);
    assert_eq!(body["data"]["urgency"], "critical");
    assert_eq!(body["data"]["dose"], "heavy");
    assert!(body["data"]["volume_ml"].as_f64().expect("volume") > 0.0);

    // 7) repeated prediction over unchanged state returns the same assessment
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/watering/predict"),
            "pwd",
            "{}",
        ))
        .await
        .expect("request failed");
    let again = body_json(resp).await;
    assert_eq!(again["data"], body["data"]);

    // 8) health analysis flags the dry soil
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/health/analyze"),
            "pwd",
            "{}",
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let score = body["data"]["score"].as_u64().expect("missing score");
    assert!(score < 100);
    assert!(
        body["data"]["issues"]
            .as_array()
            .expect("issues array")
            .iter()
            .any(|i| i.as_str().unwrap_or_default().contains("dry"))
    );

    // 9) assessment history records both kinds (watering cached once)
    let resp = app
        .clone()
        .oneshot(get(&format!("/v1/plants/{plant_id}/assessments"), "pwd"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let kinds: Vec<String> = body["data"]
        .as_array()
        .expect("history array")
        .iter()
        .map(|a| a["kind"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(kinds.contains(&"watering".to_string()));
    assert!(kinds.contains(&"health".to_string()));
    assert_eq!(kinds.iter().filter(|k| *k == "watering").count(), 1);

    // 10) filtered history honors kind
    let resp = app
        .clone()
        .oneshot(get(
            &format!("/v1/plants/{plant_id}/assessments?kind=health"),
            "pwd",
        ))
        .await
        .expect("request failed");
    let body = body_json(resp).await;
    for item in body["data"].as_array().expect("history array") {
        assert_eq!(item["kind"], "health");
    }

    // 11) watering log and retrieval
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/plants/{plant_id}/watering"),
            "pwd",
            r#"{"amount_ml": 400, "method": "manual"}"#,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get(&format!("/v1/plants/{plant_id}/watering"), "pwd"))
        .await
        .expect("request failed");
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["amount_ml"], 400);

    let _ = fs::remove_file(&temp_path);
}
