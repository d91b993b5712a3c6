//! Persistence layer: SeaORM entities and the per-user store operations built on them.

pub mod entities;
pub mod store;
