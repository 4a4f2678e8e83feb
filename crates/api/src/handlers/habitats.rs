//! Handlers for the `/habitats` resource.

use aviary_core::claims::Claims;
use aviary_core::error::CoreError;
use aviary_core::types::DbId;
use aviary_db::models::habitat::{CreateHabitat, Habitat, UpdateHabitat};
use aviary_db::repositories::HabitatRepo;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam, QueryParams, ValidJson};
use crate::query::PageParams;
use crate::response::{DeletedPayload, Success};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /habitats`.
///
/// A non-empty `search` makes this a read: every other field is ignored,
/// including their validation rules. Otherwise `name` and `region_id`
/// create a habitat, optionally linking the existing bird named by `bird`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct HabitatPostRequest {
    pub search: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub region_id: Option<DbId>,
    #[serde(alias = "habitat_bird")]
    pub bird: Option<DbId>,
}

/// Body of `PUT|PATCH /habitats/{id}`. A blank `name` is treated as absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHabitatRequest {
    pub name: Option<String>,
    pub region_id: Option<DbId>,
}

impl From<UpdateHabitatRequest> for UpdateHabitat {
    fn from(req: UpdateHabitatRequest) -> Self {
        Self {
            name: req.name.filter(|n| !n.trim().is_empty()),
            region_id: req.region_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HabitatPage {
    pub habitats: Vec<Habitat>,
    pub total_habitats: i64,
}

#[derive(Debug, Serialize)]
pub struct HabitatPayload<T: Serialize> {
    pub habitat: T,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /habitats?page=&limit=
pub async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page_request()?;
    let rows = HabitatRepo::list_page(&state.pool, page).await?;
    let habitats = page.into_page(rows)?;
    let total_habitats = HabitatRepo::count(&state.pool).await?;

    Ok(Json(Success::new(HabitatPage {
        habitats,
        total_habitats,
    })))
}

/// GET /habitats/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PathParam(id): PathParam<DbId>,
) -> AppResult<impl IntoResponse> {
    let habitat = HabitatRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Habitat",
            id,
        }))?;
    Ok(Json(Success::new(HabitatPayload { habitat })))
}

/// POST /habitats
///
/// Search or create, depending on the body. See [`HabitatPostRequest`].
pub async fn create_or_search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(input): JsonBody<HabitatPostRequest>,
) -> AppResult<Response> {
    if let Some(term) = input.search.as_deref().filter(|t| !t.is_empty()) {
        let habitats = HabitatRepo::search(&state.pool, term).await?;
        let total_habitats = i64::try_from(habitats.len()).unwrap_or(i64::MAX);
        return Ok(Json(Success::new(HabitatPage {
            habitats,
            total_habitats,
        }))
        .into_response());
    }

    input.validate()?;
    let (Some(name), Some(region_id)) = (input.name, input.region_id) else {
        return Err(AppError::BadRequest(
            "name and region_id are required".to_string(),
        ));
    };

    let habitat = HabitatRepo::create(
        &state.pool,
        &CreateHabitat {
            name,
            region_id,
            bird_id: input.bird,
        },
    )
    .await?;

    tracing::info!(
        habitat_id = habitat.id,
        bird_id = input.bird,
        sub = claims.subject().unwrap_or("-"),
        "Habitat created"
    );
    Ok(Json(Success::new(HabitatPayload { habitat })).into_response())
}

/// PUT|PATCH /habitats/{id}
///
/// An unknown `region_id` is a 400 and leaves the habitat unchanged.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(id): PathParam<DbId>,
    ValidJson(input): ValidJson<UpdateHabitatRequest>,
) -> AppResult<impl IntoResponse> {
    let habitat = HabitatRepo::update(&state.pool, id, &input.into()).await?;

    tracing::info!(
        habitat_id = habitat.id,
        region_id = habitat.region_id,
        sub = claims.subject().unwrap_or("-"),
        "Habitat updated"
    );
    Ok(Json(Success::new(HabitatPayload {
        habitat: habitat.id,
    })))
}

/// DELETE /habitats/{id}
///
/// Birds that lived in the habitat are kept; only their links go.
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(id): PathParam<DbId>,
) -> AppResult<impl IntoResponse> {
    if !HabitatRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Habitat",
            id,
        }));
    }

    tracing::info!(
        habitat_id = id,
        sub = claims.subject().unwrap_or("-"),
        "Habitat deleted"
    );
    Ok(Json(Success::new(DeletedPayload { deleted: id })))
}
