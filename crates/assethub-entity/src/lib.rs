//! # assethub-entity
//!
//! Catalog entity models for AssetHub. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! derive `sqlx::FromRow` in addition to the serde traits.

pub mod file;
pub mod project;
