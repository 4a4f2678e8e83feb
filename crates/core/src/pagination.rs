//! Page/limit windowing for list endpoints.
//!
//! The window is computed here and pushed down to SQL as `LIMIT/OFFSET`;
//! the rows that come back are then checked with [`PageRequest::into_page`]
//! so that a page past the end of the data is reported as not found.
//!
//! [`paginate`] is the in-memory reference form of the same window. The
//! handlers never call it; the store tests check `list_page` against it.

use crate::error::CoreError;

/// Page used when the caller does not supply one.
pub const DEFAULT_PAGE: i64 = 1;

/// Items per page when the caller does not supply a limit.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted limit.
pub const MAX_LIMIT: i64 = 100;

/// A validated, one-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request from optional query values.
    ///
    /// Non-positive values and a `limit` above [`MAX_LIMIT`] are rejected.
    /// The window is always `limit` items at `(page - 1) * limit`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(CoreError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if limit < 1 {
            return Err(CoreError::Validation(format!(
                "limit must be at least 1, got {limit}"
            )));
        }

        if limit > MAX_LIMIT {
            return Err(CoreError::Validation(format!(
                "limit must be at most {MAX_LIMIT}, got {limit}"
            )));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Zero-based row offset: `(page - 1) * limit`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Accept the rows fetched for this window, or report the page as
    /// out of range when nothing came back.
    pub fn into_page<T>(self, rows: Vec<T>) -> Result<Vec<T>, CoreError> {
        if rows.is_empty() {
            return Err(CoreError::PageOutOfRange { page: self.page });
        }
        Ok(rows)
    }
}

/// Slice an already ordered collection.
///
/// In-memory counterpart of the SQL window.
pub fn paginate<T>(items: &[T], request: PageRequest) -> Result<&[T], CoreError> {
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let window = items
        .get(start..)
        .map(|rest| &rest[..rest.len().min(limit)])
        .unwrap_or(&[]);

    if window.is_empty() {
        return Err(CoreError::PageOutOfRange {
            page: request.page(),
        });
    }
    Ok(window)
}
