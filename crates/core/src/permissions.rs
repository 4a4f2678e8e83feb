//! Permission strings and the gate that checks them against token claims.
//!
//! These must match the permissions configured on the identity provider's
//! API roles.

use crate::claims::Claims;
use crate::error::CoreError;

pub const GET_BIRDS: &str = "get:birds";
pub const POST_BIRDS: &str = "post:birds";
pub const PATCH_BIRDS: &str = "patch:birds";
pub const DELETE_BIRDS: &str = "delete:birds";

pub const GET_HABITATS: &str = "get:habitats";
pub const POST_HABITATS: &str = "post:habitats";
pub const PATCH_HABITATS: &str = "patch:habitats";
pub const DELETE_HABITATS: &str = "delete:habitats";

pub const GET_REGIONS: &str = "get:regions";

/// Empty requirement: any verified token passes.
pub const AUTHENTICATED: &str = "";

/// Check that `claims` grant `required`.
///
/// - No `permissions` claim at all is a malformed token shape (400).
/// - A non-empty requirement missing from the list is forbidden (403).
/// - The empty requirement only needs a well-formed claim set.
pub fn authorize(required: &str, claims: &Claims) -> Result<(), CoreError> {
    let granted = claims.permissions().ok_or_else(|| {
        CoreError::Validation("permissions not included in token".to_string())
    })?;

    if !required.is_empty() && !granted.contains(&required) {
        return Err(CoreError::Forbidden(format!(
            "permission '{required}' not granted"
        )));
    }
    Ok(())
}
