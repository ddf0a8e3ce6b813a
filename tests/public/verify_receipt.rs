//! Tests for the POST /api/verify-receipt endpoint.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

#[path = "../common/mod.rs"]
mod common;
use common::*;

const URI: &str = "/api/verify-receipt";

fn request(product_id: &str) -> Value {
    json!({
        "userId": TEST_USER_ID,
        "receiptData": "MIIT0gYJKoZIhvcNAQcCoIITwzCCE78CAQEx",
        "productId": product_id,
    })
}

fn parse_time(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("expected a timestamp string")
        .parse()
        .expect("expected an ISO-8601 timestamp")
}

/// Asserts `actual` is `days` after a moment inside [before, after].
fn assert_days_ahead(actual: DateTime<Utc>, before: DateTime<Utc>, after: DateTime<Utc>, days: i64) {
    let slack = Duration::seconds(1);
    assert!(
        actual >= before + Duration::days(days) - slack && actual <= after + Duration::days(days) + slack,
        "expiry {} is not ~{} days ahead",
        actual,
        days
    );
}

#[tokio::test]
async fn test_monthly_receipt_grants_premium() {
    let (state, db) = create_test_app_state();
    create_test_profile(db.as_ref(), TEST_USER_ID).await;

    let before = Utc::now();
    let (status, body) = read(post_json(test_app(state), URI, request("com.app.premium.monthly")).await).await;
    let after = Utc::now();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["isPremium"], true);
    assert_eq!(data["planType"], "monthly");
    let transaction_id = data["originalTransactionId"].as_str().unwrap();
    assert!(transaction_id.starts_with("mock_"));
    let expiry = parse_time(&data["subscriptionExpiry"]);
    assert_days_ahead(expiry, before, after, 30);

    let profile = queries::get_profile(db.as_ref(), TEST_USER_ID)
        .await
        .unwrap()
        .expect("profile should exist");
    assert!(profile.is_premium);
    assert_eq!(
        profile.subscription_expiry.as_deref(),
        data["subscriptionExpiry"].as_str()
    );

    let subscription = queries::get_subscription_by_transaction(db.as_ref(), transaction_id)
        .await
        .unwrap()
        .expect("subscription should be recorded");
    assert_eq!(subscription.user_id, TEST_USER_ID);
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.plan_type, PlanType::Monthly);
}

#[tokio::test]
async fn test_yearly_receipt_gets_year_long_expiry() {
    let (state, db) = create_test_app_state();
    create_test_profile(db.as_ref(), TEST_USER_ID).await;

    let before = Utc::now();
    let (status, body) = read(post_json(test_app(state), URI, request("com.app.premium.yearly")).await).await;
    let after = Utc::now();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["planType"], "yearly");
    assert_days_ahead(parse_time(&body["data"]["subscriptionExpiry"]), before, after, 365);
}

#[tokio::test]
async fn test_annual_product_is_yearly_but_case_sensitive() {
    let (state, _db) = create_test_app_state();
    let (_, body) = read(post_json(test_app(state.clone()), URI, request("com.app.annual")).await).await;
    assert_eq!(body["data"]["planType"], "yearly");

    let (_, body) = read(post_json(test_app(state), URI, request("com.app.Yearly")).await).await;
    assert_eq!(body["data"]["planType"], "monthly");
}

#[tokio::test]
async fn test_user_without_profile_still_succeeds() {
    let (state, db) = create_test_app_state();

    let (status, body) = read(post_json(test_app(state), URI, request("com.app.monthly")).await).await;

    assert_eq!(status, StatusCode::OK);
    assert!(queries::get_profile(db.as_ref(), TEST_USER_ID).await.unwrap().is_none());
    let subs = queries::list_subscriptions_for_user(db.as_ref(), TEST_USER_ID)
        .await
        .unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(
        Some(subs[0].original_transaction_id.as_str()),
        body["data"]["originalTransactionId"].as_str()
    );
}

#[tokio::test]
async fn test_repeat_purchases_record_separate_transactions() {
    let (state, db) = create_test_app_state();

    for _ in 0..2 {
        let response = post_json(test_app(state.clone()), URI, request("com.app.monthly")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let subs = queries::list_subscriptions_for_user(db.as_ref(), TEST_USER_ID)
        .await
        .unwrap();
    assert_eq!(subs.len(), 2);
    assert_ne!(subs[0].original_transaction_id, subs[1].original_transaction_id);
}

#[tokio::test]
async fn test_invalid_user_id_rejected_without_writes() {
    let (state, db) = create_test_app_state();
    let mut body = request("com.app.monthly");
    body["userId"] = json!("user-42");

    let (status, body) = read(post_json(test_app(state), URI, body).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], msg::INVALID_USER_ID);
    assert!(db.select(queries::SUBSCRIPTIONS, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_hyphenated_uuid_forms_rejected_without_writes() {
    let (state, db) = create_test_app_state();
    let hyphenated = "11111111-1111-1111-1111-111111111111";
    create_test_profile(db.as_ref(), hyphenated).await;

    for user_id in [
        "11111111111111111111111111111111",
        "{11111111-1111-1111-1111-111111111111}",
        "urn:uuid:11111111-1111-1111-1111-111111111111",
    ] {
        let mut body = request("com.app.monthly");
        body["userId"] = json!(user_id);

        let (status, body) = read(post_json(test_app(state.clone()), URI, body).await).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", user_id);
        assert_eq!(body["error"], msg::INVALID_USER_ID);
    }

    assert!(db.select(queries::SUBSCRIPTIONS, &[]).await.unwrap().is_empty());
    let profile = queries::get_profile(db.as_ref(), hyphenated)
        .await
        .unwrap()
        .unwrap();
    assert!(!profile.is_premium);
}

#[tokio::test]
async fn test_empty_fields_rejected() {
    let (state, _db) = create_test_app_state();

    let mut body = request("com.app.monthly");
    body["receiptData"] = json!("");
    let (status, body) = read(post_json(test_app(state.clone()), URI, body).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg::RECEIPT_DATA_REQUIRED);

    let (status, body) = read(post_json(test_app(state), URI, request("")).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg::PRODUCT_ID_REQUIRED);
}

#[tokio::test]
async fn test_missing_and_mistyped_fields_rejected() {
    let (state, _db) = create_test_app_state();

    let missing = json!({"userId": TEST_USER_ID, "productId": "com.app.monthly"});
    let (status, body) = read(post_json(test_app(state.clone()), URI, missing).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("receiptData"));

    let mut mistyped = request("com.app.monthly");
    mistyped["userId"] = json!(42);
    let (status, body) = read(post_json(test_app(state), URI, mistyped).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (state, _db) = create_test_app_state();

    let (status, body) = read(post_raw(test_app(state), URI, "{not json".to_string()).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_body_without_json_content_type_rejected() {
    let (state, db) = create_test_app_state();
    let body = request("com.app.monthly").to_string();

    for content_type in [None, Some("text/plain")] {
        let response =
            post_with_content_type(test_app(state.clone()), URI, content_type, body.clone()).await;
        let (status, body) = read(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", content_type);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
    assert!(db.select(queries::SUBSCRIPTIONS, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_receipt_rejected_without_writes() {
    let (mut state, db) = create_test_app_state();
    create_test_profile(db.as_ref(), TEST_USER_ID).await;
    state.validator = Arc::new(RejectingValidator);

    let (status, body) = read(post_json(test_app(state), URI, request("com.app.monthly")).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg::INVALID_RECEIPT);
    let profile = queries::get_profile(db.as_ref(), TEST_USER_ID)
        .await
        .unwrap()
        .unwrap();
    assert!(!profile.is_premium);
    assert!(db.select(queries::SUBSCRIPTIONS, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_failure_surfaces_message() {
    let app = test_app(failing_app_state("connection refused"));

    let (status, body) = read(post_json(app, URI, request("com.app.monthly")).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Failed to update user premium status: connection refused"
    );
}

#[tokio::test]
async fn test_reported_expiry_overrides_plan() {
    let (mut state, _db) = create_test_app_state();
    state.validator = Arc::new(
        MockAppleValidator::new(std::time::Duration::ZERO).with_fixed_expiry_days(30),
    );

    let before = Utc::now();
    let (status, body) = read(post_json(test_app(state), URI, request("com.app.yearly")).await).await;
    let after = Utc::now();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["planType"], "yearly");
    assert_days_ahead(parse_time(&body["data"]["subscriptionExpiry"]), before, after, 30);
}
