//! Typed path parameter helpers.

use assethub_core::error::AppError;
use assethub_core::types::{FileId, ProjectId};

/// Parses a positive file id from a path segment.
pub fn parse_file_id(s: &str) -> Result<FileId, AppError> {
    s.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(FileId::new)
        .ok_or_else(|| AppError::validation(format!("Invalid file id: {s}")))
}

/// Parses a non-negative project id from a path segment. Project 0 is the
/// unscoped bucket privileged callers upload into.
pub fn parse_project_id(s: &str) -> Result<ProjectId, AppError> {
    s.parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .map(ProjectId::new)
        .ok_or_else(|| AppError::validation(format!("Invalid project id: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_id() {
        assert_eq!(parse_file_id("42").unwrap(), FileId::new(42));
        assert!(parse_file_id("0").is_err());
        assert!(parse_file_id("abc").is_err());
    }

    #[test]
    fn test_parse_project_id_allows_zero() {
        assert_eq!(parse_project_id("0").unwrap(), ProjectId::new(0));
        assert!(parse_project_id("-3").is_err());
    }
}
