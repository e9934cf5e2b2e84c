//! HTTP handlers for entity CRUD and queries.

pub mod entity;
pub use entity::*;
