//! Filter and facet descriptors.
//!
//! Descriptors are immutable once registered and shared between lookup tables through
//! `Arc`, so every lookup that resolves to the same registration hands out the same
//! descriptor.

use std::fmt;

use serde::Deserialize;

use crate::{
    CatalogError, ValueType,
    pattern::{WildcardPattern, strip_wildcard},
};

/// Expected cardinality of a facet's values, used to pick a counting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hint {
    /// Few distinct values, cheap to enumerate.
    #[default]
    Small,
    /// Many distinct values or a continuous range.
    Large,
    /// Only whether a value exists matters.
    OnlyCount,
}

impl Hint {
    /// The counting strategy this hint calls for.
    pub fn value_range(self) -> ValueRange {
        match self {
            Self::Small | Self::OnlyCount => ValueRange::Limited,
            Self::Large => ValueRange::Large,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Large => "large",
            Self::OnlyCount => "only_count",
        })
    }
}

/// Facet counting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRange {
    /// Enumerate every term.
    Limited,
    /// Use the field cache.
    Large,
}

impl ValueRange {
    /// The engine's `facet.method` value.
    pub fn method(self) -> &'static str {
        match self {
            Self::Limited => "enum",
            Self::Large => "fc",
        }
    }
}

/// Sorts and deduplicates category names.
fn normalize_categories<I, S>(categories: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = categories.into_iter().map(Into::into).collect();
    out.sort();
    out.dedup();
    out
}

/// A filterable backend field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    /// Backend field name.
    field: String,
    /// Tag attached to filters on this field.
    tag: String,
    /// Type of compared values.
    value_type: ValueType,
    /// Category names, sorted.
    categories: Vec<String>,
}

impl FilterDescriptor {
    /// Creates a descriptor. Categories are sorted and deduplicated.
    pub fn new<I, S>(
        field: impl Into<String>,
        tag: impl Into<String>,
        value_type: ValueType,
        categories: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            tag: tag.into(),
            value_type,
            categories: normalize_categories(categories),
        }
    }

    /// Backend field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Filter tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Type of compared values.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Category names, sorted.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

/// A backend field whose values are counted per result set.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetDescriptor {
    /// Backend field name.
    field: String,
    /// Tag shared with filters on this field.
    tag: String,
    /// Type the counted values decode into.
    value_type: ValueType,
    /// Cardinality hint.
    hint: Hint,
    /// Category names, sorted.
    categories: Vec<String>,
}

impl FacetDescriptor {
    /// Creates a descriptor. Categories are sorted and deduplicated.
    pub fn new<I, S>(
        field: impl Into<String>,
        tag: impl Into<String>,
        value_type: ValueType,
        hint: Hint,
        categories: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            tag: tag.into(),
            value_type,
            hint,
            categories: normalize_categories(categories),
        }
    }

    /// Backend field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Facet tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Decoded value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Cardinality hint.
    pub fn hint(&self) -> Hint {
        self.hint
    }

    /// Category names, sorted.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

/// A concrete field matched by a dynamic facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicCandidate {
    /// The live backend field name.
    pub field: String,
    /// The segment the wildcard matched, still encoded.
    pub key: String,
}

/// A family of facets whose concrete field names are only known at runtime.
///
/// Each live field matching [`field_pattern`](Self::field_pattern) is one facet, keyed by
/// the segment the wildcard matched. The per-key tag is `<group>_<key>`.
#[derive(Debug, Clone)]
pub struct DynamicFacetDescriptor {
    /// Pattern over faceted field names.
    field_pattern: WildcardPattern,
    /// Pattern over filtered field names.
    filter_pattern: WildcardPattern,
    /// Group name, derived from the categories.
    group: String,
    /// Type the counted values decode into.
    value_type: ValueType,
    /// Cardinality hint for every derived facet.
    hint: Hint,
    /// Category names with wildcards stripped, sorted.
    categories: Vec<String>,
}

impl DynamicFacetDescriptor {
    /// Creates a descriptor. Both patterns must contain exactly one wildcard.
    pub fn new<I, S>(
        value_type: ValueType,
        field_pattern: &str,
        filter_pattern: &str,
        hint: Hint,
        categories: I,
    ) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let field_pattern = WildcardPattern::new(field_pattern)?;
        let filter_pattern = WildcardPattern::new(filter_pattern)?;
        let categories =
            normalize_categories(categories.into_iter().map(|c| strip_wildcard(c.as_ref())));
        if categories.is_empty() {
            return Err(CatalogError::NoCategories {
                field: field_pattern.as_str().to_string(),
            });
        }
        let group = categories.join("_");
        Ok(Self {
            field_pattern,
            filter_pattern,
            group,
            value_type,
            hint,
            categories,
        })
    }

    /// Group name.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Pattern over faceted field names.
    pub fn field_pattern(&self) -> &WildcardPattern {
        &self.field_pattern
    }

    /// Pattern over filtered field names.
    pub fn filter_pattern(&self) -> &WildcardPattern {
        &self.filter_pattern
    }

    /// Decoded value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Cardinality hint.
    pub fn hint(&self) -> Hint {
        self.hint
    }

    /// Category names with wildcards stripped.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns true if `category` names this family.
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Extracts the (encoded) key from a live field name.
    pub fn extract_key<'f>(&self, field: &'f str) -> Option<&'f str> {
        self.field_pattern.extract(field)
    }

    /// Faceted field name for an encoded key.
    pub fn field_for(&self, key: &str) -> String {
        self.field_pattern.expand(key)
    }

    /// Filtered field name for an encoded key.
    pub fn filter_field_for(&self, key: &str) -> String {
        self.filter_pattern.expand(key)
    }

    /// Tag for an encoded key.
    pub fn tag_for(&self, key: &str) -> String {
        format!("{}_{key}", self.group)
    }

    /// Matches every live field name against the field pattern.
    pub fn resolve_candidates(&self, live_fields: &[String]) -> Vec<DynamicCandidate> {
        live_fields
            .iter()
            .filter_map(|field| {
                self.extract_key(field).map(|key| DynamicCandidate {
                    field: field.clone(),
                    key: key.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_ranges() {
        assert_eq!(Hint::Small.value_range().method(), "enum");
        assert_eq!(Hint::OnlyCount.value_range().method(), "enum");
        assert_eq!(Hint::Large.value_range().method(), "fc");
    }

    #[test]
    fn categories_sorted() {
        let d = FilterDescriptor::new("c_s", "c", ValueType::Text, ["b", "a", "b"]);
        assert_eq!(d.categories(), ["a", "b"]);
    }

    #[test]
    fn dynamic_group_from_categories() {
        let d = DynamicFacetDescriptor::new(
            ValueType::Text,
            "stat_*_i",
            "stat_*_i",
            Hint::Large,
            ["visits_*", "*_stats"],
        )
        .unwrap();
        assert_eq!(d.categories(), ["stats", "visits"]);
        assert_eq!(d.group(), "stats_visits");
        assert!(d.contains("visits"));
        assert!(!d.contains("visits_*"));
    }

    #[test]
    fn dynamic_rejects_bad_patterns() {
        let err = DynamicFacetDescriptor::new(
            ValueType::Text,
            "tag_facet",
            "tag_*_s",
            Hint::Small,
            ["tag_*"],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPattern { pattern } if pattern == "tag_facet"));
    }

    #[test]
    fn resolves_candidates() {
        let d = DynamicFacetDescriptor::new(
            ValueType::Text,
            "tag_*_facet",
            "tag_*_s",
            Hint::Small,
            ["tag_*"],
        )
        .unwrap();
        let live = vec![
            "tag_foo_facet".to_string(),
            "title_t".to_string(),
            "tag_bar_facet".to_string(),
        ];
        let found = d.resolve_candidates(&live);
        assert_eq!(
            found,
            vec![
                DynamicCandidate {
                    field: "tag_foo_facet".into(),
                    key: "foo".into()
                },
                DynamicCandidate {
                    field: "tag_bar_facet".into(),
                    key: "bar".into()
                },
            ]
        );
        assert_eq!(d.tag_for("foo"), "tag_foo");
        assert_eq!(d.filter_field_for("foo"), "tag_foo_s");
    }
}
