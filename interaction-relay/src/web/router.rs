use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{health, interaction_webhook, AppState};

/// Build the router with every route the service exposes.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", post(interaction_webhook))
        .route("/interactions", post(interaction_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
