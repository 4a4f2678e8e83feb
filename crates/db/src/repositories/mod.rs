//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-statement writes run
//! inside a single transaction.

pub mod bird_repo;
pub mod habitat_repo;
pub mod region_repo;

pub use bird_repo::BirdRepo;
pub use habitat_repo::HabitatRepo;
pub use region_repo::RegionRepo;
