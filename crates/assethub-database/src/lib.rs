//! # assethub-database
//!
//! The version catalog and membership oracle seams, their PostgreSQL
//! implementations, and an in-memory catalog for development and tests.

pub mod catalog;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use catalog::{FileListing, MembershipOracle, VersionCatalog};
pub use connection::DatabasePool;
pub use memory::{MemoryCatalog, MemoryMembership};
