//! Error types for response decoding.

use thiserror::Error;

/// Errors that fail a whole response.
///
/// Problems with single facet values or highlight snippets are logged and skipped
/// instead.
#[derive(Debug, Error)]
pub enum ResultError {
    /// The response is not valid JSON, or lacks the document list.
    #[error("malformed engine response: {0}")]
    Json(#[from] serde_json::Error),

    /// A document could not be mapped into an item.
    #[error("failed to map document {id}: {message}")]
    Mapping {
        /// Document id, or `?` if it has none.
        id: String,
        /// What went wrong.
        message: String,
    },
}
