//! # assethub-storage
//!
//! Object store providers for AssetHub. The OSS provider signs its own
//! query-string URLs with [`signer::RequestSigner`]; the S3 provider (behind
//! the `s3` feature) delegates signing to the AWS SDK; the memory provider
//! backs development and tests.

pub mod manager;
pub mod providers;
pub mod signer;
pub mod stream;
pub mod transfer;

pub use manager::StorageManager;
pub use signer::{RequestSigner, SignedMethod};
pub use stream::RelayStream;
pub use transfer::SignedTransfer;
