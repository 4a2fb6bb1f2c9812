//! Error types for the query compiler.

use quarry_catalog::ValueType;
use quarry_filter::FilterError;
use thiserror::Error;

/// A request referenced something the catalog does not know, or built an invalid filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No filter is registered for the category.
    #[error("no such filter: {0}")]
    UnknownFilter(String),

    /// Neither a static nor a dynamic facet is registered for the category.
    #[error("no such facet: {0}")]
    UnknownFacet(String),

    /// No dynamic facet family has this group name.
    #[error("no such group: {0}")]
    UnknownGroup(String),

    /// No facet decodes into this value type.
    #[error("no facet with type {0}")]
    UnknownValueType(ValueType),

    /// A user-defined filter references an unknown `$alias`.
    #[error("no field for alias {0}")]
    UnknownAlias(String),

    /// The sort key is not registered.
    #[error("no such sort: {0}")]
    UnknownSort(String),

    /// A filter could not be built.
    #[error(transparent)]
    Filter(#[from] FilterError),
}
