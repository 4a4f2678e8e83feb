//! Repository for the `birds` table and its side of `habitat_birds`.
//!
//! Association rows are written explicitly inside the same transaction as
//! the bird row, so a bird is never persisted with a partial habitat set.

use aviary_core::error::CoreError;
use aviary_core::pagination::PageRequest;
use aviary_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::StoreError;
use crate::models::bird::{Bird, BirdDetail, BirdHabitatLink, CreateBird, UpdateBird};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, common_name, species, image_link, created_at, updated_at";

/// Provides CRUD operations for birds and their habitat links.
pub struct BirdRepo;

impl BirdRepo {
    /// Insert a new bird linked to every habitat in `input.habitat_ids`.
    ///
    /// Fails with `Validation` for an empty habitat list and with
    /// `MissingReferences` when any habitat id does not resolve. Nothing is
    /// written in either case.
    pub async fn create(pool: &PgPool, input: &CreateBird) -> Result<Bird, StoreError> {
        let habitat_ids = normalize_ids(&input.habitat_ids);
        if habitat_ids.is_empty() {
            return Err(CoreError::Validation("a bird needs at least one habitat".into()).into());
        }

        let mut tx = pool.begin().await?;
        resolve_habitats(&mut *tx, &habitat_ids).await?;

        let insert_query = format!(
            "INSERT INTO birds (common_name, species, image_link) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let bird = sqlx::query_as::<_, Bird>(&insert_query)
            .bind(&input.common_name)
            .bind(&input.species)
            .bind(&input.image_link)
            .fetch_one(&mut *tx)
            .await?;

        link_habitats(&mut *tx, bird.id, &habitat_ids).await?;

        tx.commit().await?;
        Ok(bird)
    }

    /// Find a bird by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bird>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM birds WHERE id = $1");
        sqlx::query_as::<_, Bird>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a bird by ID, enriched with habitat and region summaries.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<BirdDetail>, sqlx::Error> {
        let Some(bird) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let links = Self::habitat_links(pool, &[bird.id]).await?;
        Ok(Some(BirdDetail::assemble(bird, &links)))
    }

    /// Total number of birds.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM birds")
            .fetch_one(pool)
            .await
    }

    /// One page of birds ordered by id. May be empty.
    pub async fn list_page(pool: &PgPool, page: PageRequest) -> Result<Vec<Bird>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM birds ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Bird>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// One page of birds with their habitat and region summaries.
    ///
    /// Links for the whole page are loaded with a single query.
    pub async fn list_page_detail(
        pool: &PgPool,
        page: PageRequest,
    ) -> Result<Vec<BirdDetail>, sqlx::Error> {
        let birds = Self::list_page(pool, page).await?;
        let ids: Vec<DbId> = birds.iter().map(|b| b.id).collect();
        let links = Self::habitat_links(pool, &ids).await?;

        Ok(birds
            .into_iter()
            .map(|bird| BirdDetail::assemble(bird, &links))
            .collect())
    }

    /// Habitat links (with region data) for the given birds, ordered by
    /// bird id then habitat id.
    pub async fn habitat_links(
        pool: &PgPool,
        bird_ids: &[DbId],
    ) -> Result<Vec<BirdHabitatLink>, sqlx::Error> {
        if bird_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, BirdHabitatLink>(
            "SELECT hb.bird_id, h.id AS habitat_id, h.name AS habitat_name, \
                    r.name AS region_name, r.image_link AS region_image_link \
             FROM habitat_birds hb \
             JOIN habitats h ON h.id = hb.habitat_id \
             JOIN regions r ON r.id = h.region_id \
             WHERE hb.bird_id = ANY($1) \
             ORDER BY hb.bird_id, h.id",
        )
        .bind(bird_ids)
        .fetch_all(pool)
        .await
    }

    /// Update a bird. Only non-`None` fields are applied.
    ///
    /// A non-empty `habitat_ids` replaces the full habitat set after the
    /// same existence check as [`BirdRepo::create`]; an empty list leaves
    /// the links untouched.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateBird) -> Result<Bird, StoreError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM birds WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(CoreError::NotFound { entity: "Bird", id }.into());
        }

        let habitat_ids = input
            .habitat_ids
            .as_deref()
            .map(normalize_ids)
            .unwrap_or_default();
        if !habitat_ids.is_empty() {
            resolve_habitats(&mut *tx, &habitat_ids).await?;
            replace_habitats(&mut *tx, id, &habitat_ids).await?;
        }

        let update_query = format!(
            "UPDATE birds SET \
                common_name = COALESCE($2, common_name), \
                species = COALESCE($3, species), \
                image_link = COALESCE($4, image_link) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let bird = sqlx::query_as::<_, Bird>(&update_query)
            .bind(id)
            .bind(&input.common_name)
            .bind(&input.species)
            .bind(&input.image_link)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bird)
    }

    /// Delete a bird and its association rows. Habitats are left in place.
    ///
    /// Returns `true` if the bird existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM habitat_birds WHERE bird_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM birds WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Association helpers
// ---------------------------------------------------------------------------

/// Confirm every id names an existing habitat, key-share locking the rows
/// so they cannot be deleted before the transaction commits.
async fn resolve_habitats(conn: &mut PgConnection, ids: &[DbId]) -> Result<(), StoreError> {
    let found: Vec<DbId> =
        sqlx::query_scalar("SELECT id FROM habitats WHERE id = ANY($1) FOR KEY SHARE")
            .bind(ids)
            .fetch_all(conn)
            .await?;

    if found.len() != ids.len() {
        return Err(CoreError::MissingReferences {
            entity: "habitat",
            ids: missing_ids(ids, &found),
        }
        .into());
    }
    Ok(())
}

async fn link_habitats(
    conn: &mut PgConnection,
    bird_id: DbId,
    habitat_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO habitat_birds (habitat_id, bird_id) \
         SELECT UNNEST($1::BIGINT[]), $2 \
         ON CONFLICT DO NOTHING",
    )
    .bind(habitat_ids)
    .bind(bird_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Make `habitat_ids` the bird's exact habitat set: drop stale links, then
/// upsert the requested ones.
async fn replace_habitats(
    conn: &mut PgConnection,
    bird_id: DbId,
    habitat_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM habitat_birds WHERE bird_id = $1 AND NOT (habitat_id = ANY($2))")
        .bind(bird_id)
        .bind(habitat_ids)
        .execute(&mut *conn)
        .await?;
    link_habitats(conn, bird_id, habitat_ids).await
}

/// Sorted, duplicate-free copy of `ids`.
fn normalize_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Ids in `requested` that are absent from `found`.
fn missing_ids(requested: &[DbId], found: &[DbId]) -> Vec<DbId> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}
