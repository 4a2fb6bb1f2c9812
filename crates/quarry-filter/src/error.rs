//! Error types for filter construction.

use thiserror::Error;

/// Errors raised while building a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A direct filter was given no values to compare against.
    #[error("no values given for filter on {field}")]
    InvalidExpression {
        /// Backend field the filter was meant for.
        field: String,
    },
}
