pub mod birds;
pub mod habitats;
pub mod regions;
