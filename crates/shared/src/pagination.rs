//! Offset-based pagination utilities.
//!
//! Listings are paginated with a 1-indexed page number and a clamped page
//! size. The total row count is always reported pre-pagination so callers can
//! compute the page count themselves.

use serde::{Deserialize, Serialize};

/// Raw pagination parameters as they arrive in a query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-indexed page number.
    pub page: u32,
    /// Rows per page, clamped to the configured maximum.
    pub per_page: u32,
}

impl PageParams {
    /// Resolves raw parameters against defaults and limits.
    ///
    /// A missing or zero page becomes page 1; the page size is clamped to
    /// `[1, max_per_page]`.
    pub fn resolve(self, default_per_page: u32, max_per_page: u32) -> Page {
        Page {
            page: self.page.unwrap_or(1).max(1),
            per_page: self
                .per_page
                .unwrap_or(default_per_page)
                .clamp(1, max_per_page),
        }
    }
}

impl Page {
    /// Row offset of the first row on this page.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Row limit for this page.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Number of pages needed to display `count` rows, `ceil(count / per_page)`.
pub fn total_pages(count: i64, per_page: u32) -> i64 {
    if per_page == 0 {
        return 0;
    }
    (count + per_page as i64 - 1) / per_page as i64
}
