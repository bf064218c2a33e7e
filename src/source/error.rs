//! Dataset loading error types
//!
//! # Error Types
//!
//! - **`Io`**: The dataset file could not be read
//! - **`Json`**: The file is not a JSON array of items
//! - **`DuplicateId`**: Two items share an id

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a dataset
#[derive(Debug, Error)]
pub enum SourceError {
    /// The dataset file could not be read
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The dataset is not a JSON array of items
    #[error("Invalid dataset: {0}")]
    Json(#[from] serde_json::Error),

    /// Two items share an id
    #[error("Duplicate item id '{0}' in dataset")]
    DuplicateId(String),
}
