//! Catalog file parsing.
//!
//! Parses `.toml` catalog files into raw structures mirroring the file layout. Turning
//! them into frozen catalogs is [`CatalogSet::from_raw`](crate::CatalogSet::from_raw).

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
use toml::Value as TomlValue;

use crate::{CatalogError, Hint, SortDirection, ValueType};

/// A catalog file as parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawCatalogFile {
    /// Entity catalogs by entity name.
    pub entity: BTreeMap<String, RawEntity>,
}

/// One entity's declarations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawEntity {
    /// Alias -> backend field, for `$alias` references in user-defined filters.
    pub aliases: BTreeMap<String, String>,
    /// Backend field -> per-field request parameters.
    pub fields: BTreeMap<String, BTreeMap<String, TomlValue>>,
    /// Free-text targets.
    pub full_text: Vec<RawFullText>,
    /// Filters.
    pub filter: Vec<RawFilter>,
    /// Static facets.
    pub facet: Vec<RawFacet>,
    /// Dynamic facet families.
    pub dynamic_facet: Vec<RawDynamicFacet>,
    /// Relevance rank fields.
    pub rank: Vec<RawRank>,
    /// Named sort orders.
    pub sort: Vec<RawSort>,
}

/// Field or glob searched by free text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawTextTarget {
    /// A single field.
    Field(String),
    /// A glob over live field names.
    Pattern(String),
}

/// A `[[entity.X.full_text]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFullText {
    /// The searched field or glob.
    #[serde(flatten)]
    pub target: RawTextTarget,
    /// Relevancy weight (default 1).
    pub weight: Option<f32>,
}

/// Value type declaration: `{ kind = "enum", name = "Color", variants = [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawValue {
    /// Strings.
    #[default]
    Text,
    /// Integers.
    Integer,
    /// Floats.
    Float,
    /// Booleans.
    Boolean,
    /// Enumeration literals.
    Enum {
        /// Enumeration name.
        name: String,
        /// Accepted literals.
        variants: Vec<String>,
    },
    /// References to another entity.
    Relation {
        /// Target entity type.
        target: String,
    },
}

impl From<RawValue> for ValueType {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Text => Self::Text,
            RawValue::Integer => Self::Integer,
            RawValue::Float => Self::Float,
            RawValue::Boolean => Self::Boolean,
            RawValue::Enum { name, variants } => Self::Enum { name, variants },
            RawValue::Relation { target } => Self::Relation { target },
        }
    }
}

/// A `[[entity.X.filter]]` entry.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFilter {
    /// Backend field.
    pub field: String,
    /// Tag (default: the field name without its type suffix).
    pub tag: Option<String>,
    /// Value type (default: text).
    #[serde(default)]
    pub value: RawValue,
    /// Category name(s). Accepts a string or an array.
    #[serde_as(as = "OneOrMany<_>")]
    pub categories: Vec<String>,
}

/// A `[[entity.X.facet]]` entry.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFacet {
    /// Backend field.
    pub field: String,
    /// Tag (default: the field name without its type suffix).
    pub tag: Option<String>,
    /// Cardinality hint (default: small).
    #[serde(default)]
    pub hint: Hint,
    /// Value type (default: text).
    #[serde(default)]
    pub value: RawValue,
    /// Category name(s). Accepts a string or an array.
    #[serde_as(as = "OneOrMany<_>")]
    pub categories: Vec<String>,
}

/// A `[[entity.X.dynamic_facet]]` entry.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDynamicFacet {
    /// Faceted field pattern with one `*`.
    pub field: String,
    /// Filtered field pattern with one `*` (default: `field`).
    pub filter_field: Option<String>,
    /// Cardinality hint (default: small).
    #[serde(default)]
    pub hint: Hint,
    /// Value type (default: text).
    #[serde(default)]
    pub value: RawValue,
    /// Category name(s), wildcards allowed.
    #[serde_as(as = "OneOrMany<_>")]
    pub categories: Vec<String>,
}

/// A `[[entity.X.rank]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRank {
    /// Backend field.
    pub field: String,
    /// Integer weight (default 1).
    pub weight: Option<u32>,
}

/// A `[[entity.X.sort]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSort {
    /// Sort key.
    pub key: String,
    /// Backend field.
    pub field: String,
    /// Direction (default: asc).
    #[serde(default)]
    pub direction: SortDirection,
    /// Position within the key (default 1).
    pub order: Option<u32>,
}

/// Parses a catalog file from disk.
pub fn parse_catalog_file(path: &Path) -> Result<RawCatalogFile, CatalogError> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_catalog_str(&contents, path)
}

/// Parses a catalog from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_catalog_str(contents: &str, path: &Path) -> Result<RawCatalogFile, CatalogError> {
    toml::from_str(contents).map_err(|source| CatalogError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders a field parameter value as request text.
pub fn param_text(value: &TomlValue) -> String {
    match value {
        TomlValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> RawCatalogFile {
        parse_catalog_str(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn empty_file() {
        assert!(parse("").entity.is_empty());
    }

    #[test]
    fn categories_one_or_many() {
        let raw = parse(
            r#"
            [[entity.product.filter]]
            field = "id_l"
            categories = "id"

            [[entity.product.facet]]
            field = "color_s"
            categories = ["color", "colour"]
            "#,
        );
        let product = &raw.entity["product"];
        assert_eq!(product.filter[0].categories, vec!["id"]);
        assert_eq!(product.facet[0].categories, vec!["color", "colour"]);
        assert_eq!(product.facet[0].hint, Hint::Small);
    }

    #[test]
    fn value_kinds() {
        let raw = parse(
            r#"
            [[entity.product.facet]]
            field = "color_s"
            hint = "only_count"
            value = { kind = "enum", name = "Color", variants = ["red"] }
            categories = "color"

            [[entity.product.filter]]
            field = "owner_l"
            value = { kind = "relation", target = "user" }
            categories = "owner"
            "#,
        );
        let product = &raw.entity["product"];
        assert_eq!(product.facet[0].hint, Hint::OnlyCount);
        assert_eq!(
            ValueType::from(product.facet[0].value.clone()),
            ValueType::Enum {
                name: "Color".into(),
                variants: vec!["red".into()]
            }
        );
        assert_eq!(
            ValueType::from(product.filter[0].value.clone()),
            ValueType::Relation {
                target: "user".into()
            }
        );
    }

    #[test]
    fn full_text_field_or_pattern() {
        let raw = parse(
            r#"
            [[entity.product.full_text]]
            field = "title_t"
            weight = 2.0

            [[entity.product.full_text]]
            pattern = "attr_*_t"
            "#,
        );
        let ft = &raw.entity["product"].full_text;
        assert!(matches!(&ft[0].target, RawTextTarget::Field(f) if f == "title_t"));
        assert_eq!(ft[0].weight, Some(2.0));
        assert!(matches!(&ft[1].target, RawTextTarget::Pattern(p) if p == "attr_*_t"));
    }

    #[test]
    fn field_params_any_scalar() {
        let raw = parse(
            r#"
            [entity.product.fields.description_t]
            "hl.snippets" = 5
            "hl.fragsize" = "200"
            "#,
        );
        let params = &raw.entity["product"].fields["description_t"];
        assert_eq!(param_text(&params["hl.snippets"]), "5");
        assert_eq!(param_text(&params["hl.fragsize"]), "200");
    }

    #[test]
    fn unknown_key_rejected() {
        let result = parse_catalog_str(
            "[[entity.product.facet]]\nfield = \"a\"\ncategories = \"a\"\nbogus = 1\n",
            Path::new("bad.toml"),
        );
        assert!(matches!(result, Err(CatalogError::ParseToml { .. })));
    }
}
