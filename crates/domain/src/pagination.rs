//! Pagination metadata reported by the backend.

use serde::{Deserialize, Serialize};

/// Page position and totals, taken verbatim from a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Total number of pages.
    pub pages: u32,
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self {
            page: 1,
            limit: crate::query::DEFAULT_PAGE_LIMIT,
            total: 0,
            pages: 0,
        }
    }
}

impl PaginationMeta {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_helpers() {
        let meta = PaginationMeta {
            page: 2,
            limit: 10,
            total: 25,
            pages: 3,
        };
        assert!(meta.has_next());
        assert!(meta.has_previous());

        let empty = PaginationMeta::default();
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }
}
