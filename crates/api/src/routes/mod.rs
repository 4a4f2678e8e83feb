pub mod birds;
pub mod habitats;
pub mod health;
pub mod regions;

use axum::Router;

use crate::state::AppState;

/// Build the resource route tree. Every route is permission-gated.
///
/// Route hierarchy:
///
/// ```text
/// /birds                 list (get:birds), create (post:birds)
/// /birds/{id}            get (get:birds), update (patch:birds), delete (delete:birds)
///
/// /habitats              list (get:habitats), create or search (post:habitats)
/// /habitats/{id}         get (get:habitats), update (patch:habitats), delete (delete:habitats)
///
/// /regions               list (get:regions)
/// ```
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/birds", birds::router(state))
        .nest("/habitats", habitats::router(state))
        .nest("/regions", regions::router(state))
}
