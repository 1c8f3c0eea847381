//! Object store implementations.

pub mod memory;
pub mod oss;
#[cfg(feature = "s3")]
pub mod s3;

pub use memory::MemoryObjectStore;
pub use oss::OssObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
