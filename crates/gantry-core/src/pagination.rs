//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// An offset/limit window over the provider listing.
///
/// Construction normalizes the window: a negative offset becomes `0` and a
/// limit below `1` becomes `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    offset: u64,
    limit: u64,
}

impl PageWindow {
    /// The default page size used when a caller gives none.
    pub const DEFAULT_LIMIT: u64 = 20;

    /// Creates a normalized window.
    #[must_use]
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0).unsigned_abs(),
            limit: limit.max(1).unsigned_abs(),
        }
    }

    /// Returns the number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns `true` if a page of `len` items fills this window.
    #[must_use]
    pub const fn is_filled_by(&self, len: usize) -> bool {
        len as u64 >= self.limit
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
