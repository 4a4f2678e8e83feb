use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The requested page starts past the end of the collection.
    #[error("Page {page} is out of range")]
    PageOutOfRange { page: i64 },

    /// One or more ids referenced by a write do not resolve.
    #[error("Referenced {entity} not found: {ids:?}")]
    MissingReferences { entity: &'static str, ids: Vec<DbId> },

    /// A single foreign key supplied in a request body does not resolve.
    #[error("Invalid {entity}: {id}")]
    InvalidReference { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Uniqueness or integrity violation on write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
