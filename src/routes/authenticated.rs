use crate::{
    AppState,
    auth::{RequiredPermission, require_permission},
    handlers,
};
use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, patch, post},
};

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// guarded
///
/// Wraps a method router in the authorization guard for `permission`. The guard
/// runs before the handler and rejects the request on any failure.
fn guarded(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        RequiredPermission::new(state, permission),
        require_permission,
    ))
}

/// Authenticated Router Module
///
/// Every route here requires a bearer token carrying a specific permission.
/// `/drinks` and `/drinks/{id}` share paths with differently guarded methods, so
/// each method router is wrapped on its own before merging.
pub fn authenticated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // GET /drinks-detail
        // Long-form listing including ingredient quantities.
        .route(
            "/drinks-detail",
            guarded(get(handlers::get_drinks_detail), state, GET_DRINKS_DETAIL),
        )
        // POST /drinks
        .route(
            "/drinks",
            guarded(post(handlers::create_drink), state, POST_DRINKS),
        )
        // PATCH/DELETE /drinks/{id}
        .route(
            "/drinks/{id}",
            guarded(patch(handlers::update_drink), state, PATCH_DRINKS)
                .merge(guarded(delete(handlers::delete_drink), state, DELETE_DRINKS)),
        )
}
