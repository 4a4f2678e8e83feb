use aviary_core::error::CoreError;

/// Error returned by store writes that resolve references before writing.
///
/// Domain outcomes (missing references, unknown ids) are reported as
/// [`CoreError`] so callers can tell them apart from driver failures,
/// which include constraint violations detected by PostgreSQL.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
