//! Habitat entity model and DTOs.

use aviary_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `habitats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Habitat {
    pub id: DbId,
    pub name: String,
    pub region_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Habitat as embedded in a bird's full representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitatSummary {
    pub name: String,
    pub id: DbId,
}

/// DTO for creating a new habitat.
///
/// `bird_id` optionally links one existing bird to the new habitat.
#[derive(Debug, Clone)]
pub struct CreateHabitat {
    pub name: String,
    pub region_id: DbId,
    pub bird_id: Option<DbId>,
}

/// DTO for updating an existing habitat. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateHabitat {
    pub name: Option<String>,
    pub region_id: Option<DbId>,
}
