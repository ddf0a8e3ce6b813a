mod verify_receipt;

pub use verify_receipt::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;

use crate::db::AppState;
use crate::util::to_iso;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: to_iso(Utc::now()),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/verify-receipt", post(verify_receipt))
}
