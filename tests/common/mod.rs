//! Test utilities and fixtures for storekeeper integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use tower::ServiceExt;

pub use storekeeper::db::{AppState, Database, Filter, Row, SqliteDatabase, queries};
pub use storekeeper::error::{AppError, Result, msg};
pub use storekeeper::models::*;
pub use storekeeper::receipt::{MockAppleValidator, ReceiptValidator, ValidationResult};

pub const TEST_USER_ID: &str = "6f1c2a9e-3b7d-4e0a-9c5f-2d8b1e4a7c30";

/// In-memory store with a zero-delay mock validator.
///
/// The store is returned separately so tests can inspect it after a request.
pub fn create_test_app_state() -> (AppState, Arc<SqliteDatabase>) {
    let db = Arc::new(SqliteDatabase::in_memory().expect("Failed to create in-memory database"));
    let state = AppState {
        db: db.clone(),
        validator: Arc::new(MockAppleValidator::new(Duration::ZERO)),
    };
    (state, db)
}

/// App state over a store that fails every table operation.
pub fn failing_app_state(message: &'static str) -> AppState {
    AppState {
        db: Arc::new(FailingDatabase { message }),
        validator: Arc::new(MockAppleValidator::new(Duration::ZERO)),
    }
}

pub fn test_app(state: AppState) -> Router {
    storekeeper::handlers::app(state)
}

/// Insert a non-premium profile row for `user_id`.
pub async fn create_test_profile(db: &dyn Database, user_id: &str) {
    let row = json!({"id": user_id, "is_premium": false, "subscription_expiry": null});
    db.insert(queries::PROFILES, vec![as_row(row)])
        .await
        .expect("Failed to create test profile");
}

pub fn as_row(value: Value) -> Row {
    value.as_object().cloned().expect("row must be a JSON object")
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, serde_json::to_string(&body).unwrap()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response {
    post_with_content_type(app, uri, Some("application/json"), body).await
}

pub async fn post_with_content_type(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: String,
) -> Response {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("response body should be JSON")
}

/// Status plus parsed body.
pub async fn read(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    (status, body_json(response).await)
}

/// Validator that rejects every receipt.
pub struct RejectingValidator;

#[async_trait]
impl ReceiptValidator for RejectingValidator {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    async fn validate(&self, _receipt_data: &str, product_id: &str) -> Result<ValidationResult> {
        Ok(ValidationResult {
            is_valid: false,
            original_transaction_id: "rejected".to_string(),
            product_id: product_id.to_string(),
            expires_at: None,
        })
    }
}

/// Store whose every operation fails with `message`.
pub struct FailingDatabase {
    pub message: &'static str,
}

impl FailingDatabase {
    fn fail<T>(&self) -> Result<T> {
        Err(AppError::Database(self.message.to_string()))
    }
}

#[async_trait]
impl Database for FailingDatabase {
    async fn select(&self, _table: &str, _filters: &[Filter]) -> Result<Vec<Row>> {
        self.fail()
    }

    async fn insert(&self, _table: &str, _rows: Vec<Row>) -> Result<Vec<Row>> {
        self.fail()
    }

    async fn update(&self, _table: &str, _filters: &[Filter], _patch: Row) -> Result<Vec<Row>> {
        self.fail()
    }

    async fn delete(&self, _table: &str, _filters: &[Filter]) -> Result<usize> {
        self.fail()
    }

    async fn list_auth_users(&self) -> Result<Vec<AuthUser>> {
        self.fail()
    }

    async fn create_auth_user(&self, _input: &CreateAuthUser) -> Result<AuthUser> {
        self.fail()
    }

    async fn update_auth_user_password(&self, _user_id: &str, _password: &str) -> Result<AuthUser> {
        self.fail()
    }
}
