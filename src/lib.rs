use axum::{
    Json, Router,
    http::{HeaderName, Method, header},
};
use std::sync::Arc;
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing split by access level (public, permission-guarded).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::JwtVerifier;
pub use config::AppConfig;
pub use repository::{RepositoryState, SqliteRepository};

/// ApiDoc
///
/// OpenAPI description generated from the `#[utoipa::path]` annotations on the
/// handlers, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_drinks, handlers::get_drinks_detail, handlers::create_drink,
        handlers::update_drink, handlers::delete_drink
    ),
    components(
        schemas(
            models::Ingredient, models::IngredientSummary, models::DrinkShort,
            models::DrinkLong, models::CreateDrinkRequest, models::UpdateDrinkRequest,
            models::RecipeInput, models::DeletedResponse, error::ErrorBody
        )
    ),
    tags(
        (name = "drinks", description = "Drinks menu API")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// AppState
///
/// The application context, built once in `main` and shared by every request.
/// Cloning is cheap: each field is reference counted or small.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer.
    pub repo: RepositoryState,
    /// Bearer-token verifier holding the cached signing keys.
    pub auth: Arc<JwtVerifier>,
}

impl AppState {
    /// Only the auth section of `config` outlives startup.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            auth: Arc::new(JwtVerifier::new(config.auth)),
        }
    }
}

/// create_router
///
/// Assembles the routing table, the per-route permission guards and the
/// global middleware stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes(&state))
        .fallback(handlers::not_found)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span so every log line of a request carries its
/// method, uri and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
