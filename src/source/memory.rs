//! In-memory page source
//!
//! Serves a dataset held in memory through the same paginated interface a
//! remote endpoint would offer. Items keep their dataset order; `total` is
//! the number of matches for the query.

use super::error::SourceError;
use super::item::ImageItem;
use crate::pages::{FetchError, Page, PageSource};
use crate::query::CanonicalQuery;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Extension trait for filtering item collections by a canonical query
pub trait QueryFilterExt {
    /// Items matching `query`, in collection order
    fn apply_query<'a>(&'a self, query: &'a CanonicalQuery) -> impl Iterator<Item = &'a ImageItem> + 'a;
}

impl QueryFilterExt for [ImageItem] {
    fn apply_query<'a>(&'a self, query: &'a CanonicalQuery) -> impl Iterator<Item = &'a ImageItem> + 'a {
        self.iter().filter(move |item| item.matches(query))
    }
}

/// Dataset served page by page
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<ImageItem>,
}

impl MemorySource {
    /// Build from items, rejecting duplicate ids
    ///
    /// # Errors
    ///
    /// Returns `SourceError::DuplicateId` for the first repeated id.
    pub fn from_items(items: Vec<ImageItem>) -> Result<Self, SourceError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(SourceError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Parse a JSON array of items
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the JSON is malformed or ids repeat.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Self::from_items(serde_json::from_str(json)?)
    }

    /// Load a dataset file holding a JSON array of items
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let json = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Self::from_json(&json)?;
        debug!(path = %path.display(), items = source.len(), "dataset loaded");
        Ok(source)
    }

    #[must_use]
    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every tag used in the dataset, sorted
    #[must_use]
    pub fn tag_catalog(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .flat_map(|item| item.tags.iter().cloned())
            .collect()
    }
}

impl PageSource<ImageItem> for MemorySource {
    fn fetch_page(
        &self,
        query: &CanonicalQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ImageItem>, FetchError> {
        if page == 0 || page_size == 0 {
            return Err(FetchError::Source(format!(
                "invalid page request: page {page}, size {page_size}"
            )));
        }

        let matches: Vec<&ImageItem> = self.items.apply_query(query).collect();
        let items = matches
            .iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .map(|item| (*item).clone())
            .collect();

        Ok(Page::new(items, page, page_size, matches.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterState;
    use crate::query::serialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset(n: usize) -> MemorySource {
        let items = (0..n)
            .map(|i| ImageItem {
                tags: if i % 2 == 0 { vec!["even".to_string()] } else { vec![] },
                ..ImageItem::new(format!("img-{i}"))
            })
            .collect();
        MemorySource::from_items(items).unwrap()
    }

    #[test]
    fn test_pages_are_one_based() {
        let source = dataset(25);
        let query = CanonicalQuery::default();

        let first = source.fetch_page(&query, 1, 10).unwrap();
        assert_eq!(first.items[0].id, "img-0");
        assert_eq!(first.total, 25);

        let last = source.fetch_page(&query, 3, 10).unwrap();
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items[0].id, "img-20");

        assert!(source.fetch_page(&query, 4, 10).unwrap().items.is_empty());
    }

    #[test]
    fn test_page_zero_is_an_error() {
        let err = dataset(3).fetch_page(&CanonicalQuery::default(), 0, 10).unwrap_err();
        assert!(matches!(err, FetchError::Source(_)));
    }

    #[test]
    fn test_total_counts_matches() {
        let source = dataset(25);
        let mut filters = FilterState::new();
        filters.toggle_tag("even");
        let page = source.fetch_page(&serialize(&filters), 1, 100).unwrap();
        assert_eq!(page.total, 13);
        assert!(page.items.iter().all(|item| item.has_tag("even")));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = MemorySource::from_items(vec![ImageItem::new("a"), ImageItem::new("a")]).unwrap_err();
        assert!(matches!(err, SourceError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","tags":["cat"],"width":640}},{{"id":"b","tags":["dog","cat"]}}]"#
        )
        .unwrap();

        let source = MemorySource::load(file.path()).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.items()[0].width, 640);
        assert_eq!(
            source.tag_catalog().into_iter().collect::<Vec<_>>(),
            vec!["cat".to_string(), "dog".to_string()]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = MemorySource::load(Path::new("/nonexistent/images.json")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let err = MemorySource::from_json("{\"id\": 1}").unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }
}
