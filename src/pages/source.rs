//! Page source abstraction
//!
//! The cache never talks to the network itself. Hosts either fetch the pages
//! named by a [`PageRequest`](super::PageRequest) on their own event loop and
//! call `resolve`, or hand the cache a [`PageSource`] and let `run` do a
//! blocking fetch.

use super::error::FetchError;
use super::types::{Page, PageRequest};
use crate::query::CanonicalQuery;

/// Remote paginated query endpoint
///
/// `page` is 1-based. The source owns item uniqueness and must report a
/// stable `total` for a fixed query.
pub trait PageSource<T> {
    /// Fetch one page
    ///
    /// # Errors
    ///
    /// Any non-success is reported as a [`FetchError`].
    fn fetch_page(
        &self,
        query: &CanonicalQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Page<T>, FetchError>;

    /// Fetch every page a request names, in order
    ///
    /// # Errors
    ///
    /// Stops at the first failing page and returns its error.
    fn fetch(&self, request: &PageRequest) -> Result<Vec<Page<T>>, FetchError> {
        request
            .pages()
            .map(|page| self.fetch_page(request.query(), page, request.page_size()))
            .collect()
    }
}

impl<T, S> PageSource<T> for &S
where
    S: PageSource<T> + ?Sized,
{
    fn fetch_page(
        &self,
        query: &CanonicalQuery,
        page: usize,
        page_size: usize,
    ) -> Result<Page<T>, FetchError> {
        (**self).fetch_page(query, page, page_size)
    }
}
