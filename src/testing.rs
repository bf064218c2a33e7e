//! Testing utilities for annoview
//!
//! Provides a scripted page source that serves deterministic pages for any
//! query, with failure injection and call recording, plus small fixtures.
//!
//! Only available when compiled with `cfg(test)`.

use crate::filters::FilterState;
use crate::pages::{FetchError, Identified, Page, PageSource};
use crate::query::{CanonicalQuery, QuerySnapshot};
use std::cell::RefCell;
use std::collections::HashMap;

/// Minimal item carrying only an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub id: String,
}

impl Identified for TestItem {
    fn item_id(&self) -> &str {
        &self.id
    }
}

/// Page source serving `total` synthetic items for every query
///
/// Item ids are `<prefix>-<index>`, where the prefix is the first included
/// tag of the query (or `all`), so items of different filters can be told
/// apart.
pub struct ScriptedSource {
    total: RefCell<u64>,
    failures: RefCell<HashMap<usize, FetchError>>,
    calls: RefCell<Vec<(Option<String>, usize)>>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total: RefCell::new(total),
            failures: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Change the total reported from now on
    pub fn set_total(&self, total: u64) {
        *self.total.borrow_mut() = total;
    }

    /// Make every request for `page` fail with `error`
    pub fn fail_page(&self, page: usize, error: FetchError) {
        self.failures.borrow_mut().insert(page, error);
    }

    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    /// `(first included tag, page)` of every fetch so far
    #[must_use]
    pub fn calls(&self) -> Vec<(Option<String>, usize)> {
        self.calls.borrow().clone()
    }

    fn prefix(query: &CanonicalQuery) -> String {
        query
            .tag_ids
            .as_ref()
            .and_then(|tags| tags.first().cloned())
            .unwrap_or_else(|| "all".to_string())
    }
}

impl PageSource<TestItem> for ScriptedSource {
    fn fetch_page(
        &self,
        query: &CanonicalQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Page<TestItem>, FetchError> {
        self.calls
            .borrow_mut()
            .push((query.tag_ids.as_ref().and_then(|t| t.first().cloned()), page));

        if let Some(error) = self.failures.borrow().get(&page) {
            return Err(error.clone());
        }

        let total = *self.total.borrow();
        let prefix = Self::prefix(query);
        let start = (page.saturating_sub(1) * page_size) as u64;
        let end = (start + page_size as u64).min(total);
        let items = (start..end.max(start))
            .map(|idx| TestItem {
                id: format!("{prefix}-{idx}"),
            })
            .collect();

        Ok(Page::new(items, page, page_size, total))
    }
}

/// Snapshot of a filter that includes exactly one tag
#[must_use]
pub fn snapshot_for_tag(tag: &str) -> QuerySnapshot {
    let mut filter = FilterState::new();
    filter.toggle_tag(tag);
    QuerySnapshot::of(&filter)
}

/// Ids `item-0 .. item-{n-1}`
#[must_use]
pub fn item_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_last_page_is_short() {
        let source = ScriptedSource::new(247);
        let page = source.fetch_page(&CanonicalQuery::default(), 3, 100).unwrap();
        assert_eq!(page.items.len(), 47);
        assert_eq!(page.items[0].id, "all-200");
        assert_eq!(page.total, 247);
    }

    #[test]
    fn test_scripted_source_records_calls() {
        let source = ScriptedSource::new(10);
        let query = snapshot_for_tag("cat").query;
        let _ = source.fetch_page(&query, 1, 5);
        assert_eq!(source.calls(), vec![(Some("cat".to_string()), 1)]);
    }

    #[test]
    fn test_scripted_source_failure_injection() {
        let source = ScriptedSource::new(10);
        source.fail_page(2, FetchError::Timeout);
        assert!(source.fetch_page(&CanonicalQuery::default(), 1, 5).is_ok());
        assert_eq!(
            source.fetch_page(&CanonicalQuery::default(), 2, 5),
            Err(FetchError::Timeout)
        );
    }
}
