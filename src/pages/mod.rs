//! Paginated fetch cache
//!
//! Fetches the filtered collection page by page and exposes it as one
//! append-only sequence, together with the flags a viewport renderer needs
//! (`is_loading`, `is_fetching_next_page`, `has_next_page`, `total`).
//!
//! Fetching is split in two so the host keeps control of its event loop:
//! the cache hands out [`PageRequest`] tickets, the host fetches them, and
//! [`PageCache::resolve`] stores the result, or discards it if the filter
//! changed meanwhile.
//!
//! ```
//! use annoview::filters::FilterState;
//! use annoview::pages::{FetchError, Page, PageCache, PageSource, Resolution};
//! use annoview::query::{CanonicalQuery, QuerySnapshot};
//!
//! struct Numbers;
//!
//! impl PageSource<u32> for Numbers {
//!     fn fetch_page(&self, _q: &CanonicalQuery, page: usize, size: usize)
//!         -> Result<Page<u32>, FetchError>
//!     {
//!         let start = ((page - 1) * size) as u32;
//!         let end = (start + size as u32).min(25);
//!         Ok(Page::new((start..end).collect(), page, size, 25))
//!     }
//! }
//!
//! let mut cache = PageCache::new(10);
//! cache.reset(QuerySnapshot::of(&FilterState::new()));
//! let request = cache.load().unwrap();
//! assert_eq!(cache.run(&Numbers, request), Resolution::Applied);
//! assert_eq!(cache.len(), 10);
//! assert!(cache.has_next_page());
//! ```

pub mod cache;
pub mod error;
pub mod source;
pub mod types;

pub use cache::PageCache;
pub use error::FetchError;
pub use source::PageSource;
pub use types::{CacheStatus, Identified, Page, PageRequest, RequestKind, Resolution};
