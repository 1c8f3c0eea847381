//! Pagination query parameter extractor.

use serde::Deserialize;

use assethub_core::types::PageRequest;

/// Query parameters for paginated endpoints: `?page=&pageSize=`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default: 20, clamped to 100).
    #[serde(default = "default_page_size", alias = "page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    PageRequest::default().page_size
}

impl PaginationParams {
    /// Converts to a clamped `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let params = PaginationParams {
            page: 0,
            page_size: 10_000,
        };
        let page = params.into_page_request();
        assert_eq!(page.page, 1);
        assert!(page.page_size <= 100);
    }
}
