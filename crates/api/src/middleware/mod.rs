//! Request guards applied as route layers.
//!
//! - [`permission::require_permission`] -- Verifies the bearer token and
//!   checks one permission before the handler runs.

pub mod permission;
