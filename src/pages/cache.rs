//! Paginated fetch cache
//!
//! Accumulates the pages of the current filter key into one append-only
//! sequence for the viewport renderer.
//!
//! # Lifecycle
//!
//! ```text
//! reset(key) ──► Idle ──load()──► Loading ──page 1──► Ready
//!                                                     │  ▲
//!                                     fetch_next_page()│  │ page n+1 appended
//!                                                     ▼  │
//!                                                FetchingNext
//! ```
//!
//! Every ticket is tagged with the filter key and reset epoch it was issued
//! under. A response whose tag no longer matches is discarded, so no page of
//! an old filter can land in the sequence of a new one.

use super::error::FetchError;
use super::source::PageSource;
use super::types::{CacheStatus, Identified, Page, PageRequest, RequestKind, Resolution};
use crate::query::{FilterKey, FilterKeyObserver, QuerySnapshot};
use tracing::{debug, warn};

/// Pages fetched for the current filter key
#[derive(Debug, Clone)]
pub struct PageCache<T> {
    snapshot: Option<QuerySnapshot>,
    epoch: u64,
    page_size: usize,
    pages: Vec<Page<T>>,
    total: Option<u64>,
    status: CacheStatus,
    refetching: bool,
    error: Option<FetchError>,
}

impl<T> PageCache<T> {
    /// Empty cache requesting `page_size` items per page (minimum 1)
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            snapshot: None,
            epoch: 0,
            page_size: page_size.max(1),
            pages: Vec::new(),
            total: None,
            status: CacheStatus::Idle,
            refetching: false,
            error: None,
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Discard everything and start over for a new filter
    ///
    /// Outstanding tickets become stale.
    pub fn reset(&mut self, snapshot: QuerySnapshot) {
        self.epoch += 1;
        debug!(key = %snapshot.key, epoch = self.epoch, held_pages = self.pages.len(), "resetting page cache");
        self.snapshot = Some(snapshot);
        self.pages.clear();
        self.total = None;
        self.status = CacheStatus::Idle;
        self.refetching = false;
        self.error = None;
    }

    /// Request page 1 if nothing has been requested for the current key
    pub fn load(&mut self) -> Option<PageRequest> {
        if self.status != CacheStatus::Idle {
            return None;
        }
        let request = self.request(RequestKind::Initial, 1, 1)?;
        self.status = CacheStatus::Loading;
        Some(request)
    }

    /// Request the page after the last held one
    ///
    /// Dropped (returns `None`) while any page load is in flight or when
    /// there is no next page.
    pub fn fetch_next_page(&mut self) -> Option<PageRequest> {
        if self.status != CacheStatus::Ready {
            debug!(status = ?self.status, "dropping fetch_next_page while busy");
            return None;
        }
        if !self.has_next_page() {
            return None;
        }
        let next = self.pages.len() + 1;
        let request = self.request(RequestKind::Next, next, next)?;
        self.status = CacheStatus::FetchingNext;
        Some(request)
    }

    /// Re-request every held page for the same key
    ///
    /// With nothing held (e.g. after a failed first page) this re-issues the
    /// initial load. Dropped while a first load or another refetch is in
    /// flight.
    pub fn refetch(&mut self) -> Option<PageRequest> {
        if self.status == CacheStatus::Loading || self.refetching {
            debug!("dropping refetch while a load is in flight");
            return None;
        }
        if self.pages.is_empty() {
            let request = self.request(RequestKind::Initial, 1, 1)?;
            self.status = CacheStatus::Loading;
            return Some(request);
        }
        let request = self.request(RequestKind::Refetch, 1, self.pages.len())?;
        self.refetching = true;
        Some(request)
    }

    fn request(&self, kind: RequestKind, first_page: usize, last_page: usize) -> Option<PageRequest> {
        let snapshot = self.snapshot.as_ref()?;
        Some(PageRequest {
            key: snapshot.key.clone(),
            query: snapshot.query.clone(),
            epoch: self.epoch,
            kind,
            first_page,
            last_page,
            page_size: self.page_size,
        })
    }

    /// Hand back the outcome of a fetch
    pub fn resolve(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Page<T>>, FetchError>,
    ) -> Resolution {
        if !self.is_current(&request) {
            debug!(key = %request.key, kind = ?request.kind, "discarding stale page response");
            return Resolution::Stale;
        }

        match request.kind {
            RequestKind::Initial => self.status = CacheStatus::Ready,
            RequestKind::Next => self.status = CacheStatus::Ready,
            RequestKind::Refetch => self.refetching = false,
        }

        let pages = match result.and_then(|pages| validate(&request, pages)) {
            Ok(pages) => pages,
            Err(err) => {
                warn!(key = %request.key, kind = ?request.kind, error = %err, "page fetch failed");
                self.error = Some(err);
                return Resolution::Failed;
            }
        };

        match request.kind {
            RequestKind::Initial => {
                self.total = pages.first().map(|p| p.total);
                self.pages = pages;
            }
            RequestKind::Next => {
                self.pages.extend(pages);
            }
            RequestKind::Refetch => {
                self.total = pages.first().map(|p| p.total);
                let replaced = pages.len().min(self.pages.len());
                self.pages.splice(..replaced, pages);
            }
        }
        self.error = None;
        debug!(
            key = %request.key,
            kind = ?request.kind,
            pages = self.pages.len(),
            items = self.len(),
            total = ?self.total,
            "page response applied"
        );
        Resolution::Applied
    }

    /// Fetch a request from `source` and resolve it in one blocking step
    pub fn run<S>(&mut self, source: &S, request: PageRequest) -> Resolution
    where
        S: PageSource<T> + ?Sized,
    {
        let result = source.fetch(&request);
        self.resolve(request, result)
    }

    fn is_current(&self, request: &PageRequest) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        if snapshot.key != request.key || self.epoch != request.epoch {
            return false;
        }
        match request.kind {
            RequestKind::Initial => self.status == CacheStatus::Loading,
            RequestKind::Next => {
                self.status == CacheStatus::FetchingNext
                    && request.first_page == self.pages.len() + 1
            }
            RequestKind::Refetch => self.refetching,
        }
    }

    // ------------------------------------------------------------------
    // Reads for the viewport renderer
    // ------------------------------------------------------------------

    /// Flattened items of every held page, in fetch order
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Number of items held
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.items.is_empty())
    }

    #[must_use]
    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    /// Total reported by the first page of the current key
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        match (self.pages.last(), self.total) {
            (Some(last), Some(total)) => last.has_successor(total),
            _ => false,
        }
    }

    #[must_use]
    pub const fn status(&self) -> CacheStatus {
        self.status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == CacheStatus::Loading
    }

    #[must_use]
    pub fn is_fetching_next_page(&self) -> bool {
        self.status == CacheStatus::FetchingNext
    }

    #[must_use]
    pub const fn is_refetching(&self) -> bool {
        self.refetching
    }

    /// Error of the most recent failed fetch, cleared by the next success
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn key(&self) -> Option<&FilterKey> {
        self.snapshot.as_ref().map(|s| &s.key)
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }
}

impl<T: Identified> PageCache<T> {
    /// Ids of every held item, in display order
    #[must_use]
    pub fn visible_ids(&self) -> Vec<&str> {
        self.items().map(Identified::item_id).collect()
    }
}

impl<T> FilterKeyObserver for PageCache<T> {
    fn filter_key_changed(&mut self, snapshot: &QuerySnapshot) {
        self.reset(snapshot.clone());
    }
}

/// Check that a response covers exactly the requested pages
fn validate<T>(request: &PageRequest, pages: Vec<Page<T>>) -> Result<Vec<Page<T>>, FetchError> {
    for (expected, page) in request.pages().zip(pages.iter()) {
        if page.page != expected {
            return Err(FetchError::UnexpectedPage {
                requested: expected,
                returned: page.page,
            });
        }
    }
    if pages.len() != request.page_count() {
        return Err(FetchError::Source(format!(
            "expected {} page(s), received {}",
            request.page_count(),
            pages.len()
        )));
    }
    Ok(pages)
}
