use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::Envelope;

/// User-facing error messages shared between validation and handlers.
pub mod msg {
    pub const INVALID_USER_ID: &str = "userId must be a valid UUID";
    pub const RECEIPT_DATA_REQUIRED: &str = "receiptData is required";
    pub const PRODUCT_ID_REQUIRED: &str = "productId is required";
    pub const INVALID_RECEIPT: &str = "Invalid receipt";
    pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid receipt")]
    InvalidReceipt,

    /// Failures reported by the data store. The message is surfaced to callers.
    #[error("{0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Database(format!("Connection pool error: {}", e))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Database(format!("Database request failed: {}", e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Database(format!("Malformed database row: {}", e))
    }
}

/// Every body rejection is a 400, including a missing or wrong content type
/// (axum: 415) and an oversized body (axum: 413).
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Prefix a store failure with the operation that produced it.
    pub fn context(self, operation: &str) -> Self {
        match self {
            AppError::Database(e) => AppError::Database(format!("{}: {}", operation, e)),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::BadRequest(msg) => {
                tracing::debug!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::InvalidReceipt => {
                tracing::info!("Receipt rejected by validator");
                (StatusCode::BAD_REQUEST, msg::INVALID_RECEIPT.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    msg::INTERNAL_SERVER_ERROR.to_string(),
                )
            }
        };

        (status, Envelope::<()>::error(error)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
