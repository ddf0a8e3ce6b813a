pub mod public;
pub mod webhooks;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::AppState;

/// The full HTTP application: every router plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(webhooks::router())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
