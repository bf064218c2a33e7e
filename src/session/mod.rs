//! Explore session: one open gallery view
//!
//! Owns the filter model, the page cache and the selection, and is the only
//! place where the filter can be mutated. After every mutation the canonical
//! key is recomputed; when it changed, every [`FilterKeyObserver`] is told,
//! which resets the page cache and clears the selection, and the page-1
//! request for the new key is handed back to the host.
//!
//! # Workflow
//!
//! ```text
//! update_filters(|f| ..)
//!     ↓
//! serialize → key changed?
//!     ├─ no  → None
//!     └─ yes → cache.reset, selection.clear, extra observers
//!              ↓
//!              Some(page-1 request) → host fetches → resolve()
//! ```

use crate::buckets::BucketChart;
use crate::config::EngineConfig;
use crate::filters::{DimensionKey, FilterState};
use crate::pages::{FetchError, Identified, Page, PageCache, PageRequest, PageSource, Resolution};
use crate::query::{FilterKey, FilterKeyObserver, QuerySnapshot};
use crate::selection::SelectionTracker;
use tracing::debug;

/// State of a single explore view
pub struct ExploreSession<T> {
    filters: FilterState,
    snapshot: QuerySnapshot,
    cache: PageCache<T>,
    selection: SelectionTracker,
    observers: Vec<Box<dyn FilterKeyObserver>>,
}

impl<T> ExploreSession<T> {
    /// Session starting from `filters`; nothing is requested until [`load`](Self::load)
    #[must_use]
    pub fn new(filters: FilterState, page_size: usize) -> Self {
        let snapshot = QuerySnapshot::of(&filters);
        let mut cache = PageCache::new(page_size);
        cache.reset(snapshot.clone());
        Self {
            filters,
            snapshot,
            cache,
            selection: SelectionTracker::new(),
            observers: Vec::new(),
        }
    }

    /// Empty filter with page size and match modes from configuration
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            FilterState::with_match_modes(config.include_match_mode, config.exclude_match_mode),
            config.page_size,
        )
    }

    /// Register an additional observer of filter key changes
    ///
    /// Observers are called after the page cache and the selection, in
    /// registration order.
    pub fn subscribe(&mut self, observer: impl FilterKeyObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ------------------------------------------------------------------
    // Filter
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub const fn snapshot(&self) -> &QuerySnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn key(&self) -> &FilterKey {
        &self.snapshot.key
    }

    /// Mutate the filter
    ///
    /// Returns the page-1 request when the canonical key changed, `None`
    /// when the mutation left the query as it was.
    pub fn update_filters<F>(&mut self, mutate: F) -> Option<PageRequest>
    where
        F: FnOnce(&mut FilterState),
    {
        mutate(&mut self.filters);
        self.sync()
    }

    /// "Clear All"
    pub fn clear_filters(&mut self) -> Option<PageRequest> {
        self.update_filters(FilterState::clear_all)
    }

    /// Write a bucket chart selection into one dimension of the filter
    pub fn apply_buckets(&mut self, dimension: DimensionKey, chart: &BucketChart) -> Option<PageRequest> {
        self.update_filters(|filters| chart.apply(dimension, filters))
    }

    fn sync(&mut self) -> Option<PageRequest> {
        let snapshot = QuerySnapshot::of(&self.filters);
        if snapshot.key == self.snapshot.key {
            return None;
        }
        debug!(from = %self.snapshot.key, to = %snapshot.key, "filter key changed");

        self.cache.filter_key_changed(&snapshot);
        self.selection.filter_key_changed(&snapshot);
        for observer in &mut self.observers {
            observer.filter_key_changed(&snapshot);
        }
        self.snapshot = snapshot;
        self.cache.load()
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn cache(&self) -> &PageCache<T> {
        &self.cache
    }

    /// Request page 1 if nothing was requested yet for the current key
    pub fn load(&mut self) -> Option<PageRequest> {
        self.cache.load()
    }

    pub fn fetch_next_page(&mut self) -> Option<PageRequest> {
        self.cache.fetch_next_page()
    }

    pub fn refetch(&mut self) -> Option<PageRequest> {
        self.cache.refetch()
    }

    pub fn resolve(&mut self, request: PageRequest, result: Result<Vec<Page<T>>, FetchError>) -> Resolution {
        self.cache.resolve(request, result)
    }

    pub fn run<S>(&mut self, source: &S, request: PageRequest) -> Resolution
    where
        S: PageSource<T> + ?Sized,
    {
        self.cache.run(source, request)
    }

    /// Blocking helper: load until `pages` pages are held or none remain
    ///
    /// # Errors
    ///
    /// Returns the fetch error of the first failing page; pages loaded
    /// before it stay in the cache.
    pub fn load_pages<S>(&mut self, source: &S, pages: usize) -> Result<usize, FetchError>
    where
        S: PageSource<T> + ?Sized,
    {
        if let Some(request) = self.cache.load() {
            self.run_checked(source, request)?;
        }
        while self.cache.pages().len() < pages {
            let Some(request) = self.cache.fetch_next_page() else {
                break;
            };
            self.run_checked(source, request)?;
        }
        Ok(self.cache.pages().len())
    }

    fn run_checked<S>(&mut self, source: &S, request: PageRequest) -> Result<(), FetchError>
    where
        S: PageSource<T> + ?Sized,
    {
        match self.cache.run(source, request) {
            Resolution::Failed => Err(self
                .cache
                .error()
                .cloned()
                .unwrap_or_else(|| FetchError::Source("page fetch failed".to_string()))),
            Resolution::Applied | Resolution::Stale => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

impl<T: Identified> ExploreSession<T> {
    /// Toggle selection of every currently loaded item
    pub fn select_all_visible(&mut self) -> bool {
        self.selection.select_all(self.cache.visible_ids())
    }

    /// Selected items in display order
    #[must_use]
    pub fn selected_items(&self) -> Vec<&T> {
        self.cache
            .items()
            .filter(|item| self.selection.is_selected(item.item_id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::Bucket;
    use crate::filters::{MatchMode, NumericRange, TagDisposition};
    use crate::pages::{CacheStatus, RequestKind};
    use crate::testing::{ScriptedSource, TestItem};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> ExploreSession<TestItem> {
        ExploreSession::new(FilterState::new(), 100)
    }

    #[test]
    fn test_initial_load_for_empty_filter() {
        let source = ScriptedSource::new(247);
        let mut session = session();
        let request = session.load().unwrap();
        assert_eq!(request.kind(), RequestKind::Initial);
        assert!(session.cache().is_loading());
        assert_eq!(session.run(&source, request), Resolution::Applied);
        assert_eq!(session.cache().len(), 100);
    }

    #[test]
    fn test_key_change_resets_to_page_one() {
        let source = ScriptedSource::new(247);
        let mut session = session();
        assert_eq!(session.load_pages(&source, 3).unwrap(), 3);

        let request = session.update_filters(|f| {
            f.toggle_tag("cat");
        });
        let request = request.unwrap();
        assert_eq!(request.pages(), 1..=1);
        assert!(session.cache().is_empty());
        assert_eq!(session.cache().status(), CacheStatus::Loading);
    }

    #[test]
    fn test_noop_mutation_does_not_reset() {
        let source = ScriptedSource::new(50);
        let mut session = session();
        session.load_pages(&source, 1).unwrap();
        session.toggle_selection("all-1");

        // changing a match mode with no included tags leaves the query as is
        let request = session.update_filters(|f| f.set_include_mode(MatchMode::All));
        assert!(request.is_none());
        assert_eq!(session.cache().len(), 50);
        assert!(session.selection().is_selected("all-1"));
    }

    #[test]
    fn test_selection_clears_on_key_change() {
        let source = ScriptedSource::new(80);
        let mut session = session();
        session.load_pages(&source, 1).unwrap();
        assert!(session.select_all_visible());
        assert_eq!(session.selection().len(), 80);

        let _ = session.update_filters(|f| f.set_text_query(Some("street")));
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_select_all_tracks_growing_pages() {
        let source = ScriptedSource::new(150);
        let mut session = session();
        session.load_pages(&source, 1).unwrap();
        session.select_all_visible();
        assert_eq!(session.selection().len(), 100);

        let next = session.fetch_next_page().unwrap();
        let _ = session.run(&source, next);
        assert!(session.select_all_visible());
        assert_eq!(session.selection().len(), 150);
        assert_eq!(session.selected_items().len(), 150);
    }

    #[test]
    fn test_extra_observers_see_each_change_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut session = session();
        session.subscribe(move |snapshot: &QuerySnapshot| {
            sink.borrow_mut().push(snapshot.key.clone());
        });

        let _ = session.update_filters(|f| {
            f.toggle_tag("cat");
        });
        let _ = session.update_filters(|f| f.set_include_mode(MatchMode::Any));
        let _ = session.update_filters(|f| {
            f.toggle_tag("cat");
        });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], *session.key());
    }

    #[test]
    fn test_stale_next_page_after_filter_change() {
        let source = ScriptedSource::new(300);
        let mut session = session();
        let cat = session
            .update_filters(|f| f.set_tag_disposition("cat", Some(TagDisposition::Include)))
            .unwrap();
        assert_eq!(session.run(&source, cat), Resolution::Applied);
        let in_flight = session.fetch_next_page().unwrap();

        let dog = session
            .update_filters(|f| {
                f.remove_tag("cat");
                f.toggle_tag("dog");
            })
            .unwrap();
        let late = source.fetch(&in_flight);
        assert_eq!(session.resolve(in_flight, late), Resolution::Stale);
        let _ = session.run(&source, dog);

        assert!(session.cache().visible_ids().iter().all(|id| id.starts_with("dog-")));
    }

    #[test]
    fn test_apply_buckets_updates_filter() {
        let mut chart = BucketChart::new(vec![
            Bucket::new(0.0, 0.0, "0", 1),
            Bucket::new(1.0, 5.0, "1-5", 1),
            Bucket::new(6.0, 10.0, "6-10", 1),
        ]);
        chart.toggle(0);
        chart.toggle(2);
        let key = DimensionKey::Metric("annotation_count".to_string());

        let mut session = session();
        assert!(session.apply_buckets(key.clone(), &chart).is_some());
        assert_eq!(
            session.filters().numeric_range(&key),
            Some(NumericRange { min: 0.0, max: 10.0 })
        );
    }

    #[test]
    fn test_load_pages_reports_failure() {
        let source = ScriptedSource::new(300);
        source.fail_page(2, FetchError::Timeout);
        let mut session = session();
        assert_eq!(session.load_pages(&source, 3), Err(FetchError::Timeout));
        assert_eq!(session.cache().pages().len(), 1);
    }

    #[test]
    fn test_from_config_uses_page_size() {
        let config = EngineConfig {
            page_size: 25,
            ..EngineConfig::default()
        };
        let session: ExploreSession<TestItem> = ExploreSession::from_config(&config);
        assert_eq!(session.cache().page_size(), 25);
    }
}
