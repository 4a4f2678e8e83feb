//! Route definitions for regions.

use aviary_core::permissions::GET_REGIONS;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use crate::handlers::regions;
use crate::middleware::permission::{require_permission, PermissionGate};
use crate::state::AppState;

/// Routes mounted at `/regions`.
///
/// ```text
/// GET /   -> list   get:regions
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        get(regions::list).route_layer(from_fn_with_state(
            PermissionGate::new(state, GET_REGIONS),
            require_permission,
        )),
    )
}
