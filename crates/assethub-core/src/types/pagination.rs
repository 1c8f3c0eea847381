//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 20;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit SQL `OFFSET`.
const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size", alias = "page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self {
            page: page.clamp(1, MAX_PAGE),
            page_size,
        }
    }

    /// Re-apply the bounds to a request that came straight off the wire.
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.page_size)
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// `LIMIT` and `OFFSET` as the signed integers Postgres binds.
    pub fn sql_bounds(&self) -> AppResult<(i64, i64)> {
        let limit = i64::try_from(self.limit()).map_err(|_| {
            AppError::validation(format!("Page size {} is too large", self.page_size))
        })?;
        let offset = i64::try_from(self.offset())
            .map_err(|_| AppError::validation(format!("Page {} is out of range", self.page)))?;
        Ok((limit, offset))
    }

    /// `LIMIT` and `OFFSET` as in-memory `skip`/`take` counts.
    pub fn window(&self) -> (usize, usize) {
        let limit = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        (limit, offset)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(page_size.max(1))
        };
        Self {
            items,
            page,
            page_size,
            total,
            total_pages,
        }
    }

    /// Transform every item while keeping the paging metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
