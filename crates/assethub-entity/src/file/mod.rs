//! Logical file and version entities.

pub mod address;
pub mod format;
pub mod model;
pub mod version;

pub use address::ContentAddress;
pub use format::{FileCategory, content_type_for_format, format_from_name, guess_category};
pub use model::{LogicalFile, NewLogicalFile};
pub use version::{FileVersion, VersionDraft};
