//! Repository for the `habitats` table and its side of `habitat_birds`.

use aviary_core::error::CoreError;
use aviary_core::pagination::PageRequest;
use aviary_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::StoreError;
use crate::models::habitat::{CreateHabitat, Habitat, UpdateHabitat};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, region_id, created_at, updated_at";

/// Provides CRUD and search operations for habitats.
pub struct HabitatRepo;

impl HabitatRepo {
    /// Insert a new habitat, optionally linking one existing bird.
    ///
    /// The region (and bird, when given) are resolved inside the same
    /// transaction as the insert; an unknown id aborts the whole write.
    pub async fn create(pool: &PgPool, input: &CreateHabitat) -> Result<Habitat, StoreError> {
        let mut tx = pool.begin().await?;

        if !region_exists(&mut *tx, input.region_id).await? {
            return Err(CoreError::InvalidReference {
                entity: "region",
                id: input.region_id,
            }
            .into());
        }

        if let Some(bird_id) = input.bird_id {
            if !bird_exists(&mut *tx, bird_id).await? {
                return Err(CoreError::InvalidReference {
                    entity: "bird",
                    id: bird_id,
                }
                .into());
            }
        }

        let insert_query = format!(
            "INSERT INTO habitats (name, region_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let habitat = sqlx::query_as::<_, Habitat>(&insert_query)
            .bind(&input.name)
            .bind(input.region_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(bird_id) = input.bird_id {
            sqlx::query("INSERT INTO habitat_birds (habitat_id, bird_id) VALUES ($1, $2)")
                .bind(habitat.id)
                .bind(bird_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(habitat)
    }

    /// Find a habitat by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Habitat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM habitats WHERE id = $1");
        sqlx::query_as::<_, Habitat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Total number of habitats.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM habitats")
            .fetch_one(pool)
            .await
    }

    /// One page of habitats ordered by id. May be empty.
    pub async fn list_page(pool: &PgPool, page: PageRequest) -> Result<Vec<Habitat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM habitats ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Habitat>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Habitats whose name contains `term`, case-insensitively, ordered by id.
    ///
    /// `term` is matched literally: LIKE wildcards in it are escaped.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Habitat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM habitats WHERE name ILIKE $1 ESCAPE '\\' ORDER BY id"
        );
        sqlx::query_as::<_, Habitat>(&query)
            .bind(contains_pattern(term))
            .fetch_all(pool)
            .await
    }

    /// Update a habitat. Only non-`None` fields are applied.
    ///
    /// Fails with `NotFound` for an unknown habitat and `InvalidReference`
    /// when `region_id` does not resolve; neither case changes the row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateHabitat,
    ) -> Result<Habitat, StoreError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM habitats WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(CoreError::NotFound {
                entity: "Habitat",
                id,
            }
            .into());
        }

        if let Some(region_id) = input.region_id {
            if !region_exists(&mut *tx, region_id).await? {
                return Err(CoreError::InvalidReference {
                    entity: "region",
                    id: region_id,
                }
                .into());
            }
        }

        let update_query = format!(
            "UPDATE habitats SET \
                name = COALESCE($2, name), \
                region_id = COALESCE($3, region_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let habitat = sqlx::query_as::<_, Habitat>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(input.region_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(habitat)
    }

    /// Delete a habitat and its association rows. Birds are left in place.
    ///
    /// Returns `true` if the habitat existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let unlinked = sqlx::query("DELETE FROM habitat_birds WHERE habitat_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM habitats WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(
            habitat_id = id,
            unlinked_birds = unlinked.rows_affected(),
            "Habitat delete"
        );
        Ok(result.rows_affected() > 0)
    }

    /// Ids of the birds linked to a habitat, ascending.
    pub async fn bird_ids(pool: &PgPool, habitat_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT bird_id FROM habitat_birds WHERE habitat_id = $1 ORDER BY bird_id",
        )
        .bind(habitat_id)
        .fetch_all(pool)
        .await
    }
}

/// Check a region exists, key-share locking it until the transaction ends.
async fn region_exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
    let found: Option<DbId> =
        sqlx::query_scalar("SELECT id FROM regions WHERE id = $1 FOR KEY SHARE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(found.is_some())
}

async fn bird_exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
    let found: Option<DbId> = sqlx::query_scalar("SELECT id FROM birds WHERE id = $1 FOR KEY SHARE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Build an `ILIKE` pattern matching `term` anywhere, with `\`, `%` and `_`
/// escaped so they match literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
