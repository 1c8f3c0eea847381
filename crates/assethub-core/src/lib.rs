//! # assethub-core
//!
//! Core crate for AssetHub. Contains the configuration schema, typed
//! identifiers, pagination types, the object store trait, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other AssetHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
