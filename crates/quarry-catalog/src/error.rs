//! Error types for catalog registration, loading and value decoding.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors that can occur while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A wildcard field pattern does not contain exactly one `*`.
    #[error("field pattern '{pattern}' must contain exactly one wildcard")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// A full-text glob failed to compile.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        /// The rejected glob.
        pattern: String,
        /// Underlying glob error.
        source: globset::Error,
    },

    /// A filter or facet was registered without any category.
    #[error("no categories given for field {field}")]
    NoCategories {
        /// Backend field of the registration.
        field: String,
    },

    /// Two fields of one sort key claim the same position.
    #[error("sort field {field} clashes with {existing} at position #{order} of sort '{key}'")]
    SortClash {
        /// Sort key being registered.
        key: String,
        /// Field being registered.
        field: String,
        /// Field already holding the position.
        existing: String,
        /// The contested position.
        order: u32,
    },

    /// A field parameter names a field that was never registered.
    #[error("field {field} not registered yet")]
    UnknownField {
        /// The unregistered field.
        field: String,
    },

    /// Failed to read a catalog file.
    #[error("failed to read catalog file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse a catalog file.
    #[error("failed to parse catalog file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A catalog set has no entity of that name.
    #[error("no catalog for entity {entity}")]
    UnknownEntity {
        /// The requested entity.
        entity: String,
    },
}

/// A single facet value that could not be decoded.
///
/// Never fatal: the caller logs it and drops that one value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not an integer literal.
    #[error("'{raw}' is not an integer")]
    Integer {
        /// The raw value.
        raw: String,
    },

    /// Not a floating-point literal.
    #[error("'{raw}' is not a number")]
    Float {
        /// The raw value.
        raw: String,
    },

    /// Not a boolean literal.
    #[error("'{raw}' is not a boolean")]
    Boolean {
        /// The raw value.
        raw: String,
    },

    /// Not one of the enumeration's variants.
    #[error("'{raw}' is not a variant of {name}")]
    UnknownVariant {
        /// Enumeration name.
        name: String,
        /// The raw value.
        raw: String,
    },

    /// The relation resolver could not produce a value.
    #[error("cannot resolve '{raw}' as {target}")]
    Relation {
        /// Relation target type.
        target: String,
        /// The raw value.
        raw: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_clash_message() {
        let err = CatalogError::SortClash {
            key: "newest".into(),
            field: "b".into(),
            existing: "a".into(),
            order: 2,
        };
        assert_eq!(
            err.to_string(),
            "sort field b clashes with a at position #2 of sort 'newest'"
        );
    }

    #[test]
    fn decode_error_message() {
        let err = DecodeError::UnknownVariant {
            name: "Color".into(),
            raw: "mauve".into(),
        };
        assert_eq!(err.to_string(), "'mauve' is not a variant of Color");
    }
}
