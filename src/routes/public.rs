use crate::{AppState, handlers, openapi_json};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that need no token: the short-form listing, the liveness probe and
/// the generated API description.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and container orchestration.
        .route("/health", get(|| async { "ok" }))
        // GET /drinks
        // Short-form listing. Quantities stay hidden from anonymous clients.
        .route("/drinks", get(handlers::get_drinks))
        // GET /api-docs/openapi.json
        .route("/api-docs/openapi.json", get(openapi_json))
}
