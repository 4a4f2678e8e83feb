//! Integration tests for the bird store: transactional writes across
//! `birds` and `habitat_birds`.

use assert_matches::assert_matches;
use aviary_core::error::CoreError;
use aviary_core::pagination::PageRequest;
use aviary_db::error::StoreError;
use aviary_db::models::bird::{CreateBird, UpdateBird};
use aviary_db::repositories::{BirdRepo, HabitatRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const FLAMINGO: i64 = 1;
const BUDGERIGAR: i64 = 2;

fn new_bird(common_name: &str, habitat_ids: Vec<i64>) -> CreateBird {
    CreateBird {
        common_name: common_name.to_string(),
        species: "Testus birdus".to_string(),
        image_link: None,
        habitat_ids,
    }
}

async fn link_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM habitat_birds")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn habitat_ids(detail: &aviary_db::models::bird::BirdDetail) -> Vec<i64> {
    detail.habitats.iter().map(|h| h.id).collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_links_every_habitat(pool: PgPool) {
    let bird = BirdRepo::create(&pool, &new_bird("Scarlet ibis", vec![4, 3, 4]))
        .await
        .unwrap();

    let detail = BirdRepo::find_detail(&pool, bird.id).await.unwrap().unwrap();
    assert_eq!(habitat_ids(&detail), vec![3, 4]);
    assert_eq!(detail.regions.len(), 1);
    assert_eq!(detail.regions[0].name, "South America");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_without_habitats_is_rejected(pool: PgPool) {
    let before = BirdRepo::count(&pool).await.unwrap();

    let result = BirdRepo::create(&pool, &new_bird("Lonely", vec![])).await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
    assert_eq!(BirdRepo::count(&pool).await.unwrap(), before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_habitat_persists_nothing(pool: PgPool) {
    let birds_before = BirdRepo::count(&pool).await.unwrap();
    let links_before = link_count(&pool).await;

    let result = BirdRepo::create(&pool, &new_bird("Phantom", vec![1, 1000, 2000])).await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::MissingReferences { entity: "habitat", ref ids }))
            if ids == &vec![1000, 2000]
    );

    assert_eq!(BirdRepo::count(&pool).await.unwrap(), birds_before);
    assert_eq!(link_count(&pool).await, links_before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_common_name_rejected(pool: PgPool) {
    BirdRepo::create(&pool, &new_bird("Kea", vec![1])).await.unwrap();
    let links_before = link_count(&pool).await;

    let result = BirdRepo::create(&pool, &new_bird("Kea", vec![1, 2])).await;
    let err = match result {
        Err(StoreError::Database(err)) => err,
        other => panic!("expected a database error, got {other:?}"),
    };
    let db_err = err.as_database_error().expect("driver error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_birds_common_name"));
    assert_eq!(link_count(&pool).await, links_before);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_deduplicates_regions(pool: PgPool) {
    let flamingo = BirdRepo::find_detail(&pool, FLAMINGO).await.unwrap().unwrap();

    assert_eq!(habitat_ids(&flamingo), vec![2, 3, 4, 5, 6, 7]);
    let regions: Vec<&str> = flamingo.regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(regions, vec!["South America", "North America"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_page_detail(pool: PgPool) {
    let page = BirdRepo::list_page_detail(&pool, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, FLAMINGO);
    assert_eq!(page[1].id, BUDGERIGAR);
    assert_eq!(habitat_ids(&page[1]), vec![1]);
    assert_eq!(page[1].regions[0].name, "Oceania");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_page_past_end_is_empty(pool: PgPool) {
    let page = BirdRepo::list_page_detail(&pool, PageRequest::new(Some(1000), None).unwrap())
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_detail_unknown_is_none(pool: PgPool) {
    assert!(BirdRepo::find_detail(&pool, 999_999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_supplied_fields(pool: PgPool) {
    let updated = BirdRepo::update(
        &pool,
        BUDGERIGAR,
        &UpdateBird {
            species: Some("Melopsittacus undulatus undulatus".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.common_name, "Budgerigar");
    assert_eq!(updated.species, "Melopsittacus undulatus undulatus");
    assert!(updated.image_link.is_some());

    let detail = BirdRepo::find_detail(&pool, BUDGERIGAR).await.unwrap().unwrap();
    assert_eq!(habitat_ids(&detail), vec![1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_habitat_set(pool: PgPool) {
    BirdRepo::update(
        &pool,
        FLAMINGO,
        &UpdateBird {
            habitat_ids: Some(vec![7, 1]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let detail = BirdRepo::find_detail(&pool, FLAMINGO).await.unwrap().unwrap();
    assert_eq!(habitat_ids(&detail), vec![1, 7]);
    // Habitats that lost the bird still exist.
    assert!(HabitatRepo::find_by_id(&pool, 2).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_empty_habitats_keeps_links(pool: PgPool) {
    BirdRepo::update(
        &pool,
        BUDGERIGAR,
        &UpdateBird {
            habitat_ids: Some(vec![]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let detail = BirdRepo::find_detail(&pool, BUDGERIGAR).await.unwrap().unwrap();
    assert_eq!(habitat_ids(&detail), vec![1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_unknown_habitat_changes_nothing(pool: PgPool) {
    let result = BirdRepo::update(
        &pool,
        BUDGERIGAR,
        &UpdateBird {
            common_name: Some("Parakeet".into()),
            habitat_ids: Some(vec![2, 1000]),
            ..Default::default()
        },
    )
    .await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::MissingReferences { entity: "habitat", .. }))
    );

    let detail = BirdRepo::find_detail(&pool, BUDGERIGAR).await.unwrap().unwrap();
    assert_eq!(detail.common_name, "Budgerigar");
    assert_eq!(habitat_ids(&detail), vec![1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_duplicate_name_is_unique_violation(pool: PgPool) {
    let result = BirdRepo::update(
        &pool,
        BUDGERIGAR,
        &UpdateBird {
            common_name: Some("American flamingo".into()),
            ..Default::default()
        },
    )
    .await;
    let err = match result {
        Err(StoreError::Database(err)) => err,
        other => panic!("expected a database error, got {other:?}"),
    };
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_birds_common_name")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_is_not_found(pool: PgPool) {
    let result = BirdRepo::update(&pool, 999_999, &UpdateBird::default()).await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Bird", .. }))
    );
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_links_but_not_habitats(pool: PgPool) {
    let links_before = link_count(&pool).await;

    assert!(BirdRepo::delete(&pool, FLAMINGO).await.unwrap());

    assert!(BirdRepo::find_by_id(&pool, FLAMINGO).await.unwrap().is_none());
    assert_eq!(link_count(&pool).await, links_before - 6);
    assert_eq!(HabitatRepo::count(&pool).await.unwrap(), 7);
    assert!(!BirdRepo::delete(&pool, FLAMINGO).await.unwrap());
}
