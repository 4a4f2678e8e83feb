//! Handlers for the `/birds` resource.
//!
//! Birds are always written together with their habitat links; the store
//! performs both in one transaction.

use aviary_core::claims::Claims;
use aviary_core::error::CoreError;
use aviary_core::types::DbId;
use aviary_db::models::bird::{BirdCompact, BirdDetail, CreateBird, UpdateBird};
use aviary_db::repositories::BirdRepo;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{PathParam, QueryParams, ValidJson};
use crate::query::{BirdFormat, BirdFormatParams, PageParams};
use crate::response::{DeletedPayload, Success};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /birds`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBirdRequest {
    #[validate(length(min = 1))]
    pub common_name: String,
    #[validate(length(min = 1))]
    pub species: String,
    #[validate(length(max = 500))]
    pub image_link: Option<String>,
    /// Ids of existing habitats; at least one.
    #[validate(length(min = 1))]
    pub habitats: Vec<DbId>,
}

impl From<CreateBirdRequest> for CreateBird {
    fn from(req: CreateBirdRequest) -> Self {
        Self {
            common_name: req.common_name,
            species: req.species,
            image_link: req.image_link,
            habitat_ids: req.habitats,
        }
    }
}

/// Body of `PUT|PATCH /birds/{id}`. Blank strings are treated as absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBirdRequest {
    pub common_name: Option<String>,
    pub species: Option<String>,
    #[validate(length(max = 500))]
    pub image_link: Option<String>,
    pub habitats: Option<Vec<DbId>>,
}

impl From<UpdateBirdRequest> for UpdateBird {
    fn from(req: UpdateBirdRequest) -> Self {
        Self {
            common_name: non_blank(req.common_name),
            species: non_blank(req.species),
            image_link: non_blank(req.image_link),
            habitat_ids: req.habitats,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BirdPage {
    pub birds: Vec<BirdDetail>,
    pub total_birds: i64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BirdView {
    Full(BirdDetail),
    Compact(BirdCompact),
}

#[derive(Debug, Serialize)]
pub struct BirdPayload<T: Serialize> {
    pub bird: T,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /birds?page=&limit=
///
/// One page of birds in full format plus the overall count. A page past
/// the end is a 404.
pub async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page_request()?;
    let rows = BirdRepo::list_page_detail(&state.pool, page).await?;
    let birds = page.into_page(rows)?;
    let total_birds = BirdRepo::count(&state.pool).await?;

    Ok(Json(Success::new(BirdPage { birds, total_birds })))
}

/// GET /birds/{id}?format=full|compact
pub async fn get_by_id(
    State(state): State<AppState>,
    PathParam(id): PathParam<DbId>,
    QueryParams(params): QueryParams<BirdFormatParams>,
) -> AppResult<impl IntoResponse> {
    let detail = BirdRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bird", id }))?;

    let bird = match params.format {
        BirdFormat::Full => BirdView::Full(detail),
        BirdFormat::Compact => BirdView::Compact(detail.into()),
    };
    Ok(Json(Success::new(BirdPayload { bird })))
}

/// POST /birds
///
/// Create a bird linked to every listed habitat. Returns the new id.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(input): ValidJson<CreateBirdRequest>,
) -> AppResult<impl IntoResponse> {
    let bird = BirdRepo::create(&state.pool, &input.into()).await?;

    tracing::info!(
        bird_id = bird.id,
        sub = claims.subject().unwrap_or("-"),
        "Bird created"
    );
    Ok(Json(Success::new(BirdPayload { bird: bird.id })))
}

/// PUT|PATCH /birds/{id}
///
/// Apply the supplied fields. A non-empty `habitats` list replaces the
/// bird's habitat set.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(id): PathParam<DbId>,
    ValidJson(input): ValidJson<UpdateBirdRequest>,
) -> AppResult<impl IntoResponse> {
    let bird = BirdRepo::update(&state.pool, id, &input.into()).await?;

    tracing::info!(
        bird_id = bird.id,
        sub = claims.subject().unwrap_or("-"),
        "Bird updated"
    );
    Ok(Json(Success::new(BirdPayload { bird: bird.id })))
}

/// DELETE /birds/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(id): PathParam<DbId>,
) -> AppResult<impl IntoResponse> {
    if !BirdRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Bird", id }));
    }

    tracing::info!(bird_id = id, sub = claims.subject().unwrap_or("-"), "Bird deleted");
    Ok(Json(Success::new(DeletedPayload { deleted: id })))
}
