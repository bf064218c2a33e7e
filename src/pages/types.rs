//! Data types for paginated fetching
//!
//! - `Page`: one unit returned by the page source
//! - `PageRequest`: a ticket describing pages to fetch, tagged with the filter
//!   key and reset epoch it was issued under
//! - `CacheStatus` / `Resolution`: cache lifecycle and the outcome of
//!   resolving a ticket

use crate::query::{CanonicalQuery, FilterKey};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Items that can be tracked by id in a selection
pub trait Identified {
    fn item_id(&self) -> &str;
}

/// One page as returned by the remote query endpoint
///
/// Wire shape: `{items, page, page_size, total}` with 1-based `page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, page: usize, page_size: usize, total: u64) -> Self {
        Self {
            items,
            page,
            page_size,
            total,
        }
    }

    /// Whether another page follows this one for the given total
    #[must_use]
    pub fn has_successor(&self, total: u64) -> bool {
        (self.page as u64).saturating_mul(self.page_size as u64) < total
    }
}

/// Why a request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Page 1 after a reset (or a retry of a failed first load)
    Initial,
    /// The page following the last held one
    Next,
    /// Every currently held page, re-requested in place
    Refetch,
}

/// Ticket for pages the host must fetch and hand back to the cache
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a page request does nothing until it is fetched and resolved"]
pub struct PageRequest {
    pub(crate) key: FilterKey,
    pub(crate) query: CanonicalQuery,
    pub(crate) epoch: u64,
    pub(crate) kind: RequestKind,
    pub(crate) first_page: usize,
    pub(crate) last_page: usize,
    pub(crate) page_size: usize,
}

impl PageRequest {
    /// Filter key the request was issued for
    #[must_use]
    pub const fn key(&self) -> &FilterKey {
        &self.key
    }

    /// Payload to send to the page source
    #[must_use]
    pub const fn query(&self) -> &CanonicalQuery {
        &self.query
    }

    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Requested page numbers (1-based, inclusive)
    #[must_use]
    pub const fn pages(&self) -> RangeInclusive<usize> {
        self.first_page..=self.last_page
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.last_page + 1 - self.first_page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }
}

/// Lifecycle of the cache for the current filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// Key known, nothing requested yet
    #[default]
    Idle,
    /// First page in flight
    Loading,
    /// Settled; pages (possibly none, after a failed first load) are held
    Ready,
    /// A next-page request is in flight
    FetchingNext,
}

/// Outcome of resolving a page request
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Resolution {
    /// Pages were stored
    Applied,
    /// The fetch failed; previously held pages are untouched
    Failed,
    /// The response belongs to an older filter or was superseded and was discarded
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_successor_uses_page_times_size() {
        let page: Page<u32> = Page::new(vec![], 2, 100, 247);
        assert!(page.has_successor(247));
        let last: Page<u32> = Page::new(vec![], 3, 100, 247);
        assert!(!last.has_successor(247));
    }

    #[test]
    fn test_exact_multiple_has_no_successor() {
        let page: Page<u32> = Page::new(vec![], 2, 50, 100);
        assert!(!page.has_successor(100));
    }

    #[test]
    fn test_page_wire_shape() {
        let page: Page<String> =
            serde_json::from_str(r#"{"items":["a"],"page":1,"page_size":10,"total":1}"#).unwrap();
        assert_eq!(page, Page::new(vec!["a".to_string()], 1, 10, 1));
    }
}
