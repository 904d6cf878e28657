//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database row
//! types. Database rows are converted into these at the repository boundary.

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use session::CurrentUser;

use serde::Serialize;

/// Pagination metadata returned alongside paged listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Build pagination metadata from a page request and a total row count.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i64 = limit as i64;
        let total_pages = if limit_i64 == 0 {
            0
        } else {
            // signed `div_ceil` is unstable; total is a non-negative row
            // count, so the unsigned (stable) variant is equivalent.
            (total as u64).div_ceil(limit_i64 as u64) as i64
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Row offset for this page.
    #[must_use]
    pub const fn offset(self) -> i64 {
        (self.page.saturating_sub(1) as i64) * (self.limit as i64)
    }
}

/// A page of results plus its pagination metadata.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(1, 12, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 12, 12).total_pages, 1);
        assert_eq!(Pagination::new(1, 12, 13).total_pages, 2);
    }

    #[test]
    fn test_pagination_offset() {
        assert_eq!(Pagination::new(1, 20, 100).offset(), 0);
        assert_eq!(Pagination::new(3, 20, 100).offset(), 40);
        // Page 0 is treated as page 1
        assert_eq!(Pagination::new(0, 20, 100).offset(), 0);
    }
}
