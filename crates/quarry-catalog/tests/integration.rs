//! Integration tests for quarry-catalog.
//!
//! Tests the catalog file pipeline: parse -> register -> freeze -> lookup.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use quarry_catalog::{
    CatalogError, CatalogSet, FieldDirectory, Hint, SortDirection, ValueType, decode_key,
    encode_key,
};

/// Test helper holding a temporary directory for catalog files.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::write(&path, content).unwrap();
        path
    }
}

const PRODUCT_CATALOG: &str = r#"
[entity.product]
aliases = { colour = "color_s" }

[entity.product.fields."description_t"]
"hl.snippets" = "5"

[[entity.product.full_text]]
field = "title_t"
weight = 2.0

[[entity.product.full_text]]
field = "description_t"

[[entity.product.full_text]]
pattern = "attr_*_t"
weight = 0.5

[[entity.product.filter]]
field = "id_l"
value = { kind = "integer" }
categories = "id"

[[entity.product.facet]]
field = "color_s"
tag = "color"
hint = "small"
value = { kind = "enum", name = "Color", variants = ["red", "blue"] }
categories = ["color", "colour"]

[[entity.product.facet]]
field = "brand_s"
hint = "large"
categories = "brand"

[[entity.product.facet]]
field = "in_stock_b"
hint = "only_count"
value = { kind = "boolean" }
categories = "stock"

[[entity.product.dynamic_facet]]
field = "tag_*_facet"
filter_field = "tag_*_s"
hint = "large"
categories = "tag_*"

[[entity.product.rank]]
field = "title_rank_t"
weight = 3

[[entity.product.rank]]
field = "body_rank_t"

[[entity.product.sort]]
key = "newest"
field = "id_l"
direction = "desc"
order = 2

[[entity.product.sort]]
key = "newest"
field = "created_dt"
direction = "desc"
order = 1

[entity.user]
"#;

#[test]
fn test_load_catalog_file() {
    let env = TestEnv::new();
    let path = env.create_file("catalog.toml", PRODUCT_CATALOG);

    let set = CatalogSet::load(&path).unwrap();
    assert_eq!(set.len(), 2);
    let entities: Vec<_> = set.iter().map(|(name, _)| name).collect();
    assert_eq!(entities, vec!["product", "user"]);

    let product = set.get("product").unwrap();
    assert_eq!(product.entity(), "product");
    assert_eq!(product.all_facets().len(), 3);
    assert_eq!(product.dynamic_facets().len(), 1);
    assert!(set.get("user").unwrap().all_facets().is_empty());
}

#[test]
fn test_facet_lookups_share_descriptors() {
    let env = TestEnv::new();
    let path = env.create_file("catalog.toml", PRODUCT_CATALOG);
    let set = CatalogSet::load(&path).unwrap();
    let product = set.get("product").unwrap();

    let by_category = product.facet_by_category("colour").unwrap();
    let by_field = product.facet_by_field("color_s").unwrap();
    assert!(Arc::ptr_eq(by_category, by_field));
    assert_eq!(by_field.tag(), "color");
    assert_eq!(by_field.hint(), Hint::Small);

    // Text facets register their field; tags default to the field stem.
    let brand = product.facet_by_category("brand").unwrap();
    assert_eq!(brand.tag(), "brand");
    assert!(product.fields().contains_key("brand_s"));

    // Facets also register filters.
    let color_filter = product.filter("color").unwrap();
    assert_eq!(color_filter.field(), "color_s");
    assert_eq!(product.filter("id").unwrap().value_type(), &ValueType::Integer);

    let booleans = product.facets_by_type(&ValueType::Boolean).unwrap();
    assert_eq!(booleans.len(), 1);
    assert_eq!(booleans[0].hint(), Hint::OnlyCount);
}

#[test]
fn test_dynamic_facet_resolution() {
    let env = TestEnv::new();
    let path = env.create_file("catalog.toml", PRODUCT_CATALOG);
    let set = CatalogSet::load(&path).unwrap();
    let product = set.get("product").unwrap();

    let directory = FieldDirectory::new(vec![
        "tag_foo_facet".into(),
        "title_t".into(),
        "tag_bar_facet".into(),
    ]);
    let tag = product.dynamic_by_category("tag").unwrap();
    assert_eq!(tag.group(), "tag");
    let keys: Vec<_> = tag
        .resolve_candidates(&directory.snapshot())
        .into_iter()
        .map(|c| c.key)
        .collect();
    assert_eq!(keys, vec!["foo", "bar"]);

    let encoded = encode_key("new arrivals");
    assert_eq!(tag.field_for(&encoded), "tag_new_20arrivals_facet");
    assert_eq!(tag.filter_field_for(&encoded), "tag_new_20arrivals_s");
    let (found, key) = product
        .dynamic_for_field("tag_new_20arrivals_facet")
        .unwrap();
    assert!(Arc::ptr_eq(found, tag));
    assert_eq!(decode_key(key), "new arrivals");
}

#[test]
fn test_full_text_and_field_parameters() {
    let env = TestEnv::new();
    let path = env.create_file("catalog.toml", PRODUCT_CATALOG);
    let set = CatalogSet::load(&path).unwrap();
    let product = set.get("product").unwrap();

    let live: Arc<[String]> = vec!["attr_size_t".to_string(), "id_l".to_string()].into();
    assert_eq!(
        &*product.weighted_fields(&live),
        "title_t^2 description_t attr_size_t^0.5"
    );
    assert_eq!(
        &*product.highlight_fields(&live),
        "title_t description_t attr_size_t"
    );
    assert_eq!(product.snippet_count("description_t"), 5);
    assert_eq!(product.snippet_count("title_t"), 3);
    assert_eq!(product.field_for_alias("colour"), Some("color_s"));
}

#[test]
fn test_rank_and_sort_ordering() {
    let env = TestEnv::new();
    let path = env.create_file("catalog.toml", PRODUCT_CATALOG);
    let set = CatalogSet::load(&path).unwrap();
    let product = set.get("product").unwrap();

    let rank: Vec<_> = product
        .rank_fields()
        .iter()
        .map(|r| (r.field.as_str(), r.weight))
        .collect();
    assert_eq!(rank, vec![("title_rank_t", 3), ("body_rank_t", 1)]);

    let newest = product.sort("newest").unwrap();
    assert_eq!(newest[0].field, "created_dt");
    assert_eq!(newest[1].field, "id_l");
    assert_eq!(newest[1].direction, SortDirection::Desc);

    let keys: Vec<_> = product.sort_keys().collect();
    assert_eq!(keys, vec!["newest", "relevance"]);
}

#[test]
fn test_invalid_dynamic_pattern_is_fatal() {
    let env = TestEnv::new();
    let path = env.create_file(
        "bad.toml",
        r#"
[[entity.product.dynamic_facet]]
field = "tag_facet"
categories = "tag_*"
"#,
    );
    let err = CatalogSet::load(&path).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPattern { pattern } if pattern == "tag_facet"));
}

#[test]
fn test_sort_clash_is_fatal() {
    let env = TestEnv::new();
    let path = env.create_file(
        "clash.toml",
        r#"
[[entity.product.sort]]
key = "name"
field = "a_s"

[[entity.product.sort]]
key = "name"
field = "b_s"
"#,
    );
    let err = CatalogSet::load(&path).unwrap_err();
    assert!(matches!(err, CatalogError::SortClash { order: 1, .. }));
}

#[test]
fn test_missing_file() {
    let env = TestEnv::new();
    let err = CatalogSet::load(&env.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::ReadFile { .. }));
}

#[test]
fn test_parse_error_names_file() {
    let env = TestEnv::new();
    let path = env.create_file("broken.toml", "[[entity.product.facet]\n");
    let err = CatalogSet::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}
