//! Offset pagination window.

use serde::{Deserialize, Serialize};

/// A `skip`/`limit` window over an ordered listing.
///
/// Listings are ordered by insertion (`created_at`, then id), so consecutive
/// windows over an unchanged table are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    /// Number of records to skip.
    pub skip: u32,
    /// Maximum number of records to return.
    pub limit: u32,
}

impl Page {
    /// Create a new page window.
    #[must_use]
    pub const fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    /// First page of `limit` records.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self { skip: 0, limit }
    }

    /// The window immediately after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.limit),
            limit: self.limit,
        }
    }

    /// `OFFSET` value for SQL.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.skip)
    }

    /// `LIMIT` value for SQL.
    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.limit)
    }

    /// Apply this window to an in-memory iterator.
    pub fn apply<I: Iterator>(self, iter: I) -> impl Iterator<Item = I::Item> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        iter.skip(skip).take(take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_window_is_adjacent() {
        let page = Page::first(5);
        assert_eq!(page.next(), Page::new(5, 5));
    }

    #[test]
    fn test_apply() {
        let items: Vec<u32> = Page::new(2, 3).apply(0..10).collect();
        assert_eq!(items, vec![2, 3, 4]);

        let tail: Vec<u32> = Page::new(8, 5).apply(0..10).collect();
        assert_eq!(tail, vec![8, 9]);
    }

    #[test]
    fn test_sql_values() {
        let page = Page::new(u32::MAX, 10);
        assert_eq!(page.offset(), i64::from(u32::MAX));
        assert_eq!(page.limit(), 10);
    }
}
