//! Bird entity model, DTOs and response views.
//!
//! Birds link to habitats through the `habitat_birds` association table.
//! Two read views exist: [`BirdDetail`] with nested habitat and region
//! summaries, and [`BirdCompact`] carrying only habitat ids for edit forms.

use aviary_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::habitat::HabitatSummary;
use crate::models::region::RegionSummary;

/// A row from the `birds` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bird {
    pub id: DbId,
    pub common_name: String,
    pub species: String,
    pub image_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One bird-to-habitat link joined with the habitat's region.
#[derive(Debug, Clone, FromRow)]
pub struct BirdHabitatLink {
    pub bird_id: DbId,
    pub habitat_id: DbId,
    pub habitat_name: String,
    pub region_name: String,
    pub region_image_link: Option<String>,
}

/// Full bird representation with nested habitat and region summaries.
#[derive(Debug, Clone, Serialize)]
pub struct BirdDetail {
    pub id: DbId,
    pub common_name: String,
    pub species: String,
    pub image_link: Option<String>,
    pub habitats: Vec<HabitatSummary>,
    pub regions: Vec<RegionSummary>,
}

impl BirdDetail {
    /// Assemble the view from a bird row and its links.
    ///
    /// Links belonging to other birds are ignored. Regions are listed once,
    /// in the order their first habitat appears.
    pub fn assemble(bird: Bird, links: &[BirdHabitatLink]) -> Self {
        let mut habitats = Vec::new();
        let mut regions: Vec<RegionSummary> = Vec::new();

        for link in links.iter().filter(|l| l.bird_id == bird.id) {
            habitats.push(HabitatSummary {
                name: link.habitat_name.clone(),
                id: link.habitat_id,
            });
            let region = RegionSummary {
                name: link.region_name.clone(),
                image: link.region_image_link.clone(),
            };
            if !regions.contains(&region) {
                regions.push(region);
            }
        }

        Self {
            id: bird.id,
            common_name: bird.common_name,
            species: bird.species,
            image_link: bird.image_link,
            habitats,
            regions,
        }
    }
}

/// Compact bird representation for edit contexts: habitats as bare ids.
#[derive(Debug, Clone, Serialize)]
pub struct BirdCompact {
    pub id: DbId,
    pub common_name: String,
    pub species: String,
    pub image_link: Option<String>,
    pub habitats: Vec<DbId>,
}

impl From<BirdDetail> for BirdCompact {
    fn from(detail: BirdDetail) -> Self {
        Self {
            id: detail.id,
            common_name: detail.common_name,
            species: detail.species,
            image_link: detail.image_link,
            habitats: detail.habitats.into_iter().map(|h| h.id).collect(),
        }
    }
}

/// DTO for creating a new bird. `habitat_ids` must not be empty.
#[derive(Debug, Clone)]
pub struct CreateBird {
    pub common_name: String,
    pub species: String,
    pub image_link: Option<String>,
    pub habitat_ids: Vec<DbId>,
}

/// DTO for updating an existing bird. All fields optional.
///
/// A non-empty `habitat_ids` replaces the bird's full habitat set.
#[derive(Debug, Clone, Default)]
pub struct UpdateBird {
    pub common_name: Option<String>,
    pub species: Option<String>,
    pub image_link: Option<String>,
    pub habitat_ids: Option<Vec<DbId>>,
}
