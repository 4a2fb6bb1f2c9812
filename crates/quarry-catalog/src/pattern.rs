//! Wildcard field patterns and full-text field targets.

use std::fmt;

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::CatalogError;

/// The wildcard marker in field patterns.
pub const WILDCARD: char = '*';

/// A backend field pattern with exactly one `*`, such as `tag_*_facet`.
///
/// Matches concrete field names and extracts the part the wildcard stands for.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    /// The pattern as registered.
    source: String,
    /// Text before the wildcard.
    prefix: String,
    /// Text after the wildcard.
    suffix: String,
    /// Anchored matcher capturing the wildcard segment.
    regex: Regex,
}

impl WildcardPattern {
    /// Compiles a pattern, failing with [`CatalogError::InvalidPattern`] unless it contains
    /// exactly one wildcard.
    pub fn new(source: &str) -> Result<Self, CatalogError> {
        let invalid = || CatalogError::InvalidPattern {
            pattern: source.to_string(),
        };
        let (prefix, suffix) = source.split_once(WILDCARD).ok_or_else(invalid)?;
        if suffix.contains(WILDCARD) {
            return Err(invalid());
        }
        let regex = Regex::new(&format!(
            "^{}(.*){}$",
            regex::escape(prefix),
            regex::escape(suffix)
        ))
        .map_err(|_| invalid())?;
        Ok(Self {
            source: source.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            regex,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the segment of `field` the wildcard matched, or `None` if it does not match.
    pub fn extract<'f>(&self, field: &'f str) -> Option<&'f str> {
        self.regex
            .captures(field)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Substitutes `key` for the wildcard.
    pub fn expand(&self, key: &str) -> String {
        format!("{}{key}{}", self.prefix, self.suffix)
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Strips wildcard markers from a category name: `tag_*` and `*_tag` become `tag`.
pub fn strip_wildcard(category: &str) -> String {
    category.replace("_*", "").replace("*_", "").replace('*', "")
}

/// A field or set of fields searched by free text.
#[derive(Debug, Clone)]
pub enum FullTextTarget {
    /// One named field.
    Field(String),
    /// Every live field matching a glob.
    Pattern {
        /// The glob as registered.
        source: String,
        /// Compiled matcher.
        matcher: GlobMatcher,
    },
}

impl FullTextTarget {
    /// A single named field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// A glob over live field names, such as `attr_*_t`.
    pub fn pattern(glob: &str) -> Result<Self, CatalogError> {
        let matcher = Glob::new(glob)
            .map_err(|source| CatalogError::InvalidGlob {
                pattern: glob.to_string(),
                source,
            })?
            .compile_matcher();
        Ok(Self::Pattern {
            source: glob.to_string(),
            matcher,
        })
    }

    /// Appends the concrete field names this target stands for.
    pub fn names_into<'a>(&'a self, live_fields: &'a [String], out: &mut Vec<&'a str>) {
        match self {
            Self::Field(name) => out.push(name),
            Self::Pattern { matcher, .. } => out.extend(
                live_fields
                    .iter()
                    .filter(|f| matcher.is_match(f.as_str()))
                    .map(String::as_str),
            ),
        }
    }

    /// The field name or glob as registered.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Field(name) => name,
            Self::Pattern { source, .. } => source,
        }
    }
}
