//! Dataset sources
//!
//! [`MemorySource`] serves an annotated image dataset, loaded from a JSON
//! file, through the [`PageSource`](crate::pages::PageSource) interface.
//! It backs the command line front end and doubles as a reference for the
//! filter semantics a remote endpoint is expected to apply.

pub mod error;
pub mod item;
pub mod memory;

pub use error::SourceError;
pub use item::ImageItem;
pub use memory::{MemorySource, QueryFilterExt};
