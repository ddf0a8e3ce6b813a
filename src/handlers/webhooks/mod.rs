pub mod apple;

pub use apple::handle_apple_webhook;

use axum::{Router, routing::post};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/apple", post(handle_apple_webhook))
}
