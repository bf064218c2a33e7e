//! Page fetch error types
//!
//! A failed fetch is never fatal: the cache stores the error next to the
//! pages it already holds, and the host decides whether to retry.
//!
//! # Error Types
//!
//! - **`Source`**: Any non-success reported by the page source
//! - **`Timeout`**: The source gave up waiting for the remote endpoint
//! - **`Decode`**: The response could not be decoded into a page
//! - **`UnexpectedPage`**: The source answered with a different page number

use thiserror::Error;

/// Errors surfaced by a page fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Generic non-success from the page source
    #[error("Page source error: {0}")]
    Source(String),

    /// Request timed out at the source
    #[error("Page request timed out")]
    Timeout,

    /// Response body could not be decoded
    #[error("Failed to decode page: {0}")]
    Decode(String),

    /// Source returned a page other than the one requested
    #[error("Requested page {requested} but source returned page {returned}")]
    UnexpectedPage { requested: usize, returned: usize },
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
