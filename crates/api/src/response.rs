//! Shared response envelope for API handlers.
//!
//! Successful responses are `{ "success": true, ...payload }`, where the
//! payload fields differ per endpoint. Use [`Success`] with a typed payload
//! struct instead of ad-hoc `serde_json::json!` bodies.

use serde::Serialize;

/// `{ "success": true, ...T }` envelope. `T` must serialize as a map.
///
/// ```ignore
/// Ok(Json(Success::new(DeletedPayload { deleted: id })))
/// ```
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}

/// `{ "deleted": <id> }`, shared by every delete endpoint.
#[derive(Debug, Serialize)]
pub struct DeletedPayload {
    pub deleted: aviary_core::types::DbId,
}
