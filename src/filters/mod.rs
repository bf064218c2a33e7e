//! Filter model for the explore gallery
//!
//! Holds the multi-dimensional filter the user composes in the UI: tag
//! include/exclude dispositions with AND/OR match modes, numeric ranges over
//! image dimensions and quality metrics, categorical attribute facets, a
//! free-text query, and an explicit item id set.
//!
//! # Examples
//!
//! ```
//! use annoview::filters::{DimensionKey, FilterState, TagDisposition};
//!
//! let mut filter = FilterState::new();
//! assert_eq!(filter.toggle_tag("cat"), Some(TagDisposition::Include));
//! filter.set_numeric_range(DimensionKey::Width, 640.0, 1920.0);
//! assert!(filter.has_active_filters());
//!
//! filter.clear_all();
//! assert!(!filter.has_active_filters());
//! ```

pub mod state;
pub mod types;

pub use state::FilterState;
pub use types::{DimensionKey, ItemId, MatchMode, NumericRange, SchemaId, TagDisposition, TagId};
