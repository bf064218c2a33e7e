//! Query serializer
//!
//! Converts the filter model into the canonical payload sent to the page
//! source. The same payload, encoded as a [`FilterKey`], decides whether the
//! page cache and the selection must be reset; [`FilterKeyObserver`] is the
//! subscription both of them implement.

pub mod canonical;
pub mod observer;

pub use canonical::{CanonicalQuery, FilterKey, QuerySnapshot, serialize};
pub use observer::FilterKeyObserver;
