//! Handlers for the `/regions` resource (read-only over HTTP).

use aviary_db::models::region::Region;
use aviary_db::repositories::RegionRepo;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::Success;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegionList {
    pub regions: Vec<Region>,
}

/// GET /regions
///
/// Every region ordered by id. Not paginated.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let regions = RegionRepo::list(&state.pool).await?;
    Ok(Json(Success::new(RegionList { regions })))
}
