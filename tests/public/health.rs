use axum::http::StatusCode;
use chrono::{DateTime, Utc};

#[path = "../common/mod.rs"]
mod common;
use common::*;

#[tokio::test]
async fn test_health_reports_ok_with_timestamp() {
    let (state, _db) = create_test_app_state();
    let before = Utc::now() - chrono::Duration::seconds(1);

    let (status, body) = read(get(test_app(state), "/health").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let timestamp = body["timestamp"]
        .as_str()
        .expect("timestamp should be a string");
    assert!(timestamp.ends_with('Z'));
    let parsed: DateTime<Utc> = timestamp.parse().expect("timestamp should be ISO-8601");
    assert!(parsed >= before);
}

#[tokio::test]
async fn test_health_does_not_touch_store() {
    let response = get(test_app(failing_app_state("store is down")), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (state, _db) = create_test_app_state();
    let response = get(test_app(state), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
