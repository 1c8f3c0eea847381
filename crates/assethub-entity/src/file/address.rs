//! Storage key derivation.
//!
//! Keys have the shape
//! `{actor}/{owner}/assets/{file}/v{number}_{short}{ext}` where `short` is
//! the first and last four characters of the content hash joined by `_`
//! (or the whole hash when it has fewer than eight characters). The file id
//! and version number make every version's object distinct even when two
//! uploads share a short hash and extension.

use serde::{Deserialize, Serialize};

use assethub_core::types::{FileId, ProjectId, UserId};

/// Inputs that determine where a version's bytes live in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAddress {
    /// Owning scope.
    pub owner: ProjectId,
    /// User performing the upload.
    pub actor: UserId,
    /// Logical file the version belongs to.
    pub file_id: FileId,
    /// Content hash as supplied by the client.
    pub hash: String,
    /// Declared file name; only its extension is used.
    pub file_name: String,
}

impl ContentAddress {
    /// Shortened hash used in the object name.
    pub fn short_hash(&self) -> String {
        let chars: Vec<char> = self.hash.chars().collect();
        if chars.len() < 8 {
            return self.hash.clone();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}_{tail}")
    }

    /// Extension of the declared name including the leading dot, or `""`.
    pub fn extension(&self) -> &str {
        extension_of(&self.file_name)
    }

    /// Derive the storage key for `version_number` of this file.
    pub fn storage_key(&self, version_number: i32) -> String {
        format!(
            "{}/{}/assets/{}/v{}_{}{}",
            self.actor,
            self.owner,
            self.file_id,
            version_number,
            self.short_hash(),
            self.extension()
        )
    }
}

/// Extension of the last path element of `name`, dot included.
pub(crate) fn extension_of(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(idx) => &base[idx..],
        None => "",
    }
}
