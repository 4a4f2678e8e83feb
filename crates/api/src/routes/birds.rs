//! Route definitions for birds.

use aviary_core::permissions::{DELETE_BIRDS, GET_BIRDS, PATCH_BIRDS, POST_BIRDS};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::birds;
use crate::middleware::permission::{require_permission, PermissionGate};
use crate::state::AppState;

/// Routes mounted at `/birds`.
///
/// ```text
/// GET    /       -> list        get:birds
/// POST   /       -> create      post:birds
/// GET    /{id}   -> get_by_id   get:birds
/// PUT    /{id}   -> update      patch:birds
/// PATCH  /{id}   -> update      patch:birds
/// DELETE /{id}   -> delete      delete:birds
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let gate = |permission: &'static str| {
        from_fn_with_state(PermissionGate::new(state, permission), require_permission)
    };

    Router::new()
        .route(
            "/",
            get(birds::list)
                .route_layer(gate(GET_BIRDS))
                .merge(post(birds::create).route_layer(gate(POST_BIRDS))),
        )
        .route(
            "/{id}",
            get(birds::get_by_id)
                .route_layer(gate(GET_BIRDS))
                .merge(
                    put(birds::update)
                        .patch(birds::update)
                        .route_layer(gate(PATCH_BIRDS)),
                )
                .merge(delete(birds::delete).route_layer(gate(DELETE_BIRDS))),
        )
}
