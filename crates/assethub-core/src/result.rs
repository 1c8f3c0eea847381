//! Convenience result type alias for AssetHub.

use crate::error::AppError;

/// A specialized `Result` type for AssetHub operations.
pub type AppResult<T> = Result<T, AppError>;
