//! File categories and format-to-content-type mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::address::extension_of;

/// Coarse content kind of a logical file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Plain text and source code.
    Text,
    /// Raster and vector images.
    Image,
    /// Video containers.
    Video,
    /// Audio containers.
    Audio,
    /// Anything not recognised.
    Binary,
    /// Compressed archives.
    Archive,
}

impl FileCategory {
    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Binary => "binary",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileCategory {
    type Err = assethub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "binary" => Ok(Self::Binary),
            "archive" => Ok(Self::Archive),
            _ => Err(assethub_core::AppError::validation(format!(
                "Invalid file category: '{s}'. Expected one of: text, image, video, audio, binary, archive"
            ))),
        }
    }
}

/// Map a format token to the content type used for signing and serving.
pub fn content_type_for_format(format: &str) -> &'static str {
    match format.trim().to_lowercase().as_str() {
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Guess a category from a format token.
pub fn guess_category(format: &str) -> FileCategory {
    match format.trim().to_lowercase().as_str() {
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" => FileCategory::Archive,
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" => FileCategory::Image,
        "mp4" | "avi" | "mov" | "wmv" | "flv" | "mkv" => FileCategory::Video,
        "mp3" | "wav" | "ogg" | "flac" | "aac" => FileCategory::Audio,
        "txt" | "md" | "json" | "xml" | "html" | "css" | "js" | "ts" | "go" | "py" | "java"
        | "c" | "cpp" | "h" => FileCategory::Text,
        _ => FileCategory::Binary,
    }
}

/// Lowercase format token taken from a file name's extension.
pub fn format_from_name(name: &str) -> String {
    extension_of(name).trim_start_matches('.').to_lowercase()
}
