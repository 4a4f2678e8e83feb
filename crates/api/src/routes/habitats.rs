//! Route definitions for habitats.

use aviary_core::permissions::{DELETE_HABITATS, GET_HABITATS, PATCH_HABITATS, POST_HABITATS};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::habitats;
use crate::middleware::permission::{require_permission, PermissionGate};
use crate::state::AppState;

/// Routes mounted at `/habitats`.
///
/// ```text
/// GET    /       -> list               get:habitats
/// POST   /       -> create_or_search   post:habitats
/// GET    /{id}   -> get_by_id          get:habitats
/// PUT    /{id}   -> update             patch:habitats
/// PATCH  /{id}   -> update             patch:habitats
/// DELETE /{id}   -> delete             delete:habitats
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let gate = |permission: &'static str| {
        from_fn_with_state(PermissionGate::new(state, permission), require_permission)
    };

    Router::new()
        .route(
            "/",
            get(habitats::list)
                .route_layer(gate(GET_HABITATS))
                .merge(post(habitats::create_or_search).route_layer(gate(POST_HABITATS))),
        )
        .route(
            "/{id}",
            get(habitats::get_by_id)
                .route_layer(gate(GET_HABITATS))
                .merge(
                    put(habitats::update)
                        .patch(habitats::update)
                        .route_layer(gate(PATCH_HABITATS)),
                )
                .merge(delete(habitats::delete).route_layer(gate(DELETE_HABITATS))),
        )
}
