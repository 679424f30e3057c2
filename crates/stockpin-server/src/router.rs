use axum::{routing::get, Router};

use crate::handler;

/// Build the axum router with the liveness endpoints.
pub fn build_router() -> Router {
    Router::new()
        .route("/", get(handler::root_handler))
        .route("/health", get(handler::health_handler))
}
