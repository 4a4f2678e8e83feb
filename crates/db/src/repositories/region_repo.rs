//! Repository for the `regions` table.

use aviary_core::types::DbId;
use sqlx::PgPool;

use crate::models::region::{CreateRegion, Region, UpdateRegion};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, image_link, created_at, updated_at";

/// Provides CRUD operations for regions.
pub struct RegionRepo;

impl RegionRepo {
    /// Insert a new region, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRegion) -> Result<Region, sqlx::Error> {
        let query = format!(
            "INSERT INTO regions (name, image_link) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(&input.name)
            .bind(&input.image_link)
            .fetch_one(pool)
            .await
    }

    /// Find a region by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM regions WHERE id = $1");
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all regions ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Region>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM regions ORDER BY id");
        sqlx::query_as::<_, Region>(&query).fetch_all(pool).await
    }

    /// Update a region. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRegion,
    ) -> Result<Option<Region>, sqlx::Error> {
        let query = format!(
            "UPDATE regions SET \
                name = COALESCE($2, name), \
                image_link = COALESCE($3, image_link) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.image_link)
            .fetch_optional(pool)
            .await
    }

    /// Delete a region. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while habitats still reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM regions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
