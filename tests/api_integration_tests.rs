//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use ttl_cache::{api::create_router, AppState, CacheConfig};

// == Helper Functions ==

fn create_test_app(default_ttl: Duration) -> Router {
    let state = AppState::from_config(CacheConfig::new(default_ttl, Duration::ZERO)).unwrap();
    create_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// == SET / GET ==

#[tokio::test]
async fn test_set_then_get() {
    let app = create_test_app(Duration::from_secs(300));

    let (status, json) = send(&app, "PUT", "/cache/user:1", Some(json!({"value": {"name": "ada"}}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"key": "user:1", "stored": true}));

    let (status, json) = send(&app, "GET", "/cache/user:1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"]["name"], "ada");
    assert!(json["ttl_remaining_ms"].as_u64().unwrap() <= 300_000);
}

#[tokio::test]
async fn test_set_null_value_is_noop() {
    let app = create_test_app(Duration::ZERO);

    send(&app, "PUT", "/cache/k", Some(json!({"value": 1, "no_expire": true}))).await;
    let (status, json) = send(&app, "PUT", "/cache/k", Some(json!({"value": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stored"], false);

    let (_, json) = send(&app, "GET", "/cache/k", None).await;
    assert_eq!(json["value"], 1);
    assert!(json["ttl_remaining_ms"].is_null());
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app(Duration::ZERO);

    let (status, json) = send(&app, "GET", "/cache/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app(Duration::ZERO);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/cache/k")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_key_too_long() {
    let app = create_test_app(Duration::ZERO);
    let uri = format!("/cache/{}", "x".repeat(300));

    let (status, _) = send(&app, "PUT", &uri, Some(json!({"value": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for method in ["GET", "DELETE"] {
        let (status, _) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = send(&app, "POST", &format!("{}/touch", uri), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == DELETE / FLUSH ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app(Duration::ZERO);
    send(&app, "PUT", "/cache/gone", Some(json!({"value": "bye"}))).await;

    let (status, json) = send(&app, "DELETE", "/cache/gone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "bye");

    let (status, _) = send(&app, "DELETE", "/cache/gone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_flush_endpoint() {
    let app = create_test_app(Duration::ZERO);
    send(&app, "PUT", "/cache/a", Some(json!({"value": 1}))).await;
    send(&app, "PUT", "/cache/b", Some(json!({"value": 2}))).await;

    let (status, json) = send(&app, "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["flushed"], 2);

    let (status, _) = send(&app, "GET", "/cache/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == TTL behaviour ==

#[tokio::test(start_paused = true)]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app(Duration::ZERO);
    send(&app, "PUT", "/cache/short", Some(json!({"value": 1, "ttl_ms": 100}))).await;

    tokio::time::advance(Duration::from_millis(50)).await;
    let (status, _) = send(&app, "GET", "/cache/short", None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::advance(Duration::from_millis(100)).await;
    let (status, _) = send(&app, "GET", "/cache/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still stored until a sweep runs
    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["total_entries"], 1);

    let (_, json) = send(&app, "POST", "/sweep", None).await;
    assert_eq!(json["evicted"], 1);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["total_entries"], 0);
    assert_eq!(stats["evictions"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_touch_endpoint() {
    let app = create_test_app(Duration::ZERO);
    send(&app, "PUT", "/cache/t", Some(json!({"value": "v", "ttl_ms": 100}))).await;

    tokio::time::advance(Duration::from_millis(80)).await;
    let (status, json) = send(&app, "POST", "/cache/t/touch", Some(json!({"ttl_ms": 100}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["touched"], true);

    tokio::time::advance(Duration::from_millis(80)).await;
    let (status, json) = send(&app, "GET", "/cache/t", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "v");

    let (status, _) = send(&app, "POST", "/cache/missing/touch", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == STATS / HEALTH ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app(Duration::ZERO);
    send(&app, "PUT", "/cache/a", Some(json!({"value": 1}))).await;
    send(&app, "GET", "/cache/a", None).await;
    send(&app, "GET", "/cache/b", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(Duration::ZERO);

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
