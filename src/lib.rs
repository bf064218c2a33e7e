//! Annoview - A filtered, paginated collection engine for annotation galleries
//!
//! This library holds the state behind an "explore" gallery over an
//! annotated image dataset: the filter the user composes, the canonical query
//! derived from it, an append-only page cache with stale-response discard,
//! bucket chart selections, and the selection set used for bulk actions.

use thiserror::Error;

pub mod buckets;
pub mod cli;
pub mod config;
pub mod filters;
pub mod logging;
pub mod output;
pub mod pages;
pub mod query;
pub mod selection;
pub mod session;
pub mod source;

#[cfg(test)]
mod testing;

pub use buckets::{Bucket, BucketChart};
pub use filters::{DimensionKey, FilterState, MatchMode, NumericRange, TagDisposition};
pub use pages::{FetchError, Page, PageCache, PageRequest, PageSource, Resolution};
pub use query::{CanonicalQuery, FilterKey, FilterKeyObserver, QuerySnapshot};
pub use selection::SelectionTracker;
pub use session::ExploreSession;
pub use source::{ImageItem, MemorySource, SourceError};

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum AnnoviewError {
    /// Page fetch error
    #[error("Fetch error: {0}")]
    FetchError(#[from] pages::FetchError),
    /// Dataset loading error
    #[error("Source error: {0}")]
    SourceError(#[from] source::SourceError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents a JSON encoding error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
