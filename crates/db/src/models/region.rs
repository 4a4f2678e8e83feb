//! Region entity model and DTOs.
//!
//! Regions are the top of the hierarchy: each habitat belongs to exactly
//! one region.

use aviary_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `regions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Region {
    pub id: DbId,
    pub name: String,
    pub image_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Region as embedded in a bird's full representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub name: String,
    pub image: Option<String>,
}

/// DTO for creating a new region.
#[derive(Debug, Clone)]
pub struct CreateRegion {
    pub name: String,
    pub image_link: Option<String>,
}

/// DTO for updating an existing region. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateRegion {
    pub name: Option<String>,
    pub image_link: Option<String>,
}
