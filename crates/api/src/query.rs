//! Shared query parameter types for API handlers.

use aviary_core::error::CoreError;
use aviary_core::pagination::PageRequest;
use serde::Deserialize;

/// Pagination parameters (`?page=&limit=`).
///
/// Both are optional; see [`PageRequest::new`] for defaults and bounds.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page_request(&self) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.page, self.limit)
    }
}

/// Representation requested for a single bird.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BirdFormat {
    /// Nested habitat and region summaries.
    #[default]
    Full,
    /// Habitat ids only, for edit forms.
    Compact,
}

/// `?format=full|compact` on `GET /birds/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct BirdFormatParams {
    #[serde(default)]
    pub format: BirdFormat,
}
