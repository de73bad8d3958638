use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use sitepulse_core::config::Config;
use sitepulse_core::store::{EventQuery, EventStore};
use sitepulse_duckdb::DuckDbBackend;
use sitepulse_server::app::build_app;
use sitepulse_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/sitepulse-test".to_string(),
        allowed_site: Some("example.com".to_string()),
        ..Config::default()
    }
}

async fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

fn collect_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/collect")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "198.51.100.10")
        .header("user-agent", "Mozilla/5.0 Chrome/120")
        .body(Body::from(body))
        .expect("request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

async fn stored_count(state: &AppState) -> usize {
    state
        .store
        .query_events(&EventQuery::site("example.com"))
        .await
        .expect("query")
        .len()
}

#[tokio::test]
async fn test_collect_stores_event_and_returns_id() {
    let (state, app) = setup().await;

    let response = app
        .oneshot(collect_request(
            json!({
                "site": "example.com",
                "type": "pageview",
                "ts": 1_700_000_000_000_i64,
                "visitor_id": "v1",
                "session_id": "s1",
                "path": "/pricing",
                "url": "https://example.com/pricing",
                "referrer": "",
                "data": { "title": "Pricing" }
            })
            .to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    let id = body["id"].as_str().expect("id").to_string();

    let rows = state
        .store
        .query_events(&EventQuery::site("example.com"))
        .await
        .expect("query");
    assert_eq!(rows.len(), 1);
    let event = &rows[0];
    assert_eq!(event.id, id);
    assert_eq!(event.path.as_deref(), Some("/pricing"));
    assert_eq!(event.referrer, None);
    assert_eq!(event.ua.as_deref(), Some("Mozilla/5.0 Chrome/120"));
    assert_eq!(event.ip_hash.len(), 16);
    assert_eq!(event.data, r#"{"title":"Pricing"}"#);
}

#[tokio::test]
async fn test_collect_missing_type_is_rejected_without_write() {
    let (state, app) = setup().await;

    let response = app
        .oneshot(collect_request(
            json!({ "site": "example.com", "ts": 1 }).to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "missing_field");
    assert_eq!(body["error"]["field"], "type");
    assert_eq!(stored_count(&state).await, 0);
}

#[tokio::test]
async fn test_collect_other_site_is_forbidden() {
    let (state, app) = setup().await;

    let response = app
        .oneshot(collect_request(
            json!({ "site": "evil.com", "type": "pageview", "ts": 1 }).to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "site_not_allowed");
    assert_eq!(stored_count(&state).await, 0);
}

#[tokio::test]
async fn test_collect_accepts_beacon_text_plain() {
    let (state, app) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/collect")
        .header("content-type", "text/plain;charset=UTF-8")
        .body(Body::from(
            json!({ "site": "example.com", "type": "duration", "ts": 5 }).to_string(),
        ))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stored_count(&state).await, 1);
}

#[tokio::test]
async fn test_collect_malformed_json_is_bad_request() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(collect_request("{not json".to_string()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_collect_body_over_limit_is_rejected() {
    let (state, app) = setup().await;

    let blob = "x".repeat(200 * 1024);
    let response = app
        .oneshot(collect_request(
            json!({ "site": "example.com", "type": "pageview", "ts": 1, "data": { "blob": blob } })
                .to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(stored_count(&state).await, 0);
}
