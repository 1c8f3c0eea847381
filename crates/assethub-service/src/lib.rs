//! # assethub-service
//!
//! Application services of the AssetHub gateway. Each service receives its
//! collaborators at construction time as `Arc` handles and takes the
//! caller's [`RequestContext`] explicitly on every operation.

pub mod context;
pub mod file;

pub use context::{Principal, RequestContext};
pub use file::{
    DownloadLink, DownloadService, FileContent, FileDeletion, FileService, PreUploadRequest,
    PreUploadResponse, UploadService, UploadThroughRequest, VersionSelector, VersionService,
};
