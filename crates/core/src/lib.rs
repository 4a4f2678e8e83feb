//! Domain building blocks shared by the store and the HTTP layer.
//!
//! Nothing in here performs I/O: error taxonomy, verified token claims,
//! the permission gate and the pagination window all live here so they can
//! be unit tested in isolation.

pub mod claims;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod types;
