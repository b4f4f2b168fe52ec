//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// `?page=&per_page=` query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Largest page size a client may request.
    pub const MAX_PER_PAGE: u32 = 100;

    /// Rows to skip; page 0 is read as page 1.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * self.limit()
    }

    /// Returns the limit for database queries, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.clamp(1, Self::MAX_PER_PAGE))
    }
}

/// One page of a list plus where it sits in the whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Position of this page.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number, at least 1.
    pub page: u32,
    /// Page size actually applied, after clamping.
    pub per_page: u32,
    /// Matching items across all pages.
    pub total: u64,
    /// Number of pages, at least 1.
    pub total_pages: u32,
    /// True when a later page has items.
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    /// Wraps `data` fetched with `request`'s offset and limit.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let limit = request.limit();
        let page = request.page.max(1);
        let total_pages = u32::try_from(total.div_ceil(limit).max(1)).unwrap_or(u32::MAX);

        Self {
            data,
            meta: PageMeta {
                page,
                per_page: u32::try_from(limit).unwrap_or(PageRequest::MAX_PER_PAGE),
                total,
                total_pages,
                has_more: page < total_pages,
            },
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
