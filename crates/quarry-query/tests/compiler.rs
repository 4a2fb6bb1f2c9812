//! Integration tests for quarry-query.
//!
//! Builds catalogs through the public builder and checks the compiled request.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::sync::Arc;

use quarry_catalog::{
    Catalog, CatalogBuilder, FieldDirectory, FullTextTarget, Hint, SortDirection, ValueType,
};
use quarry_filter::Filter;
use quarry_query::{BackendRequest, QueryBuilder, QueryError};

fn product_catalog() -> Catalog {
    let mut b = CatalogBuilder::new("product");
    b.register_string_facet("color_s", "color", Hint::Small, ["color"])
        .unwrap();
    b.register_string_facet("size_s", "size", Hint::Small, ["size"])
        .unwrap();
    b.register_string_facet("brand_s", "brand", Hint::Large, ["brand"])
        .unwrap();
    b.register_dynamic_facet(ValueType::Text, "tag_*_facet", None, Hint::Large, ["tag_*"])
        .unwrap();
    b.register_field("description_t", ["description"]);
    b.field_parameter("description_t", "hl.snippets", 5).unwrap();
    b.register_full_text(FullTextTarget::field("title_t"), 2.0);
    b.register_full_text(FullTextTarget::field("description_t"), 1.0);
    b.register_rank_field("body_t", 1);
    b.register_rank_field("title_t", 3);
    b.register_sort("newest", "created_dt", SortDirection::Desc, 1)
        .unwrap();
    b.register_sort("newest", "id_l", SortDirection::Asc, 2)
        .unwrap();
    b.build()
}

fn live(names: &[&str]) -> Arc<[String]> {
    names.iter().map(|s| s.to_string()).collect()
}

fn compile(f: impl FnOnce(&mut QueryBuilder<'_>)) -> BackendRequest {
    let catalog = product_catalog();
    let mut q = QueryBuilder::new(&catalog, live(&["tag_foo_facet", "tag_bar_facet"]));
    f(&mut q);
    q.build()
}

#[test]
fn filtered_facet_excludes_its_own_filter() {
    let req = compile(|q| {
        q.apply_filter("color", ["red"]).unwrap();
        q.add_facet("color", None).unwrap();
        q.add_facet("size", None).unwrap();
    });
    assert_eq!(req.filter_queries(), ["{!tag=color}color_s:red"]);
    assert_eq!(req.facet_fields(), ["{!ex=color}color_s", "size_s"]);
}

#[test]
fn unapplied_filter_does_not_exclude() {
    let catalog = product_catalog();
    let mut q = QueryBuilder::new(&catalog, live(&[]));
    let _unused = q.filter("color", ["red"]).unwrap();
    q.add_facet("color", None).unwrap();
    let req = q.build();
    assert!(req.filter_queries().is_empty());
    assert_eq!(req.facet_fields(), ["color_s"]);
}

#[test]
fn composed_filters_declare_no_tag() {
    let req = compile(|q| {
        let color = q.filter("color", ["red"]).unwrap();
        let size = q.filter("size", ["42"]).unwrap();
        q.apply(&color.or(size).negated());
        q.add_facet("size", None).unwrap();
    });
    assert_eq!(req.filter_queries(), ["-color_s:red AND -size_s:42"]);
    assert_eq!(req.facet_fields(), ["size_s"]);
}

#[test]
fn decorated_filter_keeps_its_tag() {
    let req = compile(|q| {
        let color = q.filter("color", ["red"]).unwrap().negated().uncached();
        q.apply(&color);
        q.add_facet("color", None).unwrap();
    });
    assert_eq!(
        req.filter_queries(),
        ["{!tag=color cache=false}-color_s:red"]
    );
    assert_eq!(req.facet_fields(), ["{!ex=color}color_s"]);
}

#[test]
fn dynamic_facet_for_one_key() {
    let catalog = product_catalog();
    let mut q = QueryBuilder::new(&catalog, live(&["tag_foo_facet", "tag_bar_facet"]));
    q.add_dynamic_facet("tag", "foo", None).unwrap();
    let facets: Vec<_> = q.assigned_facets().iter().collect();
    assert_eq!(facets.len(), 1);
    assert_eq!(facets[0].tag, "tag_foo");
    assert_eq!(facets[0].field, "tag_foo_facet");
}

#[test]
fn dynamic_category_expands_over_live_fields() {
    let req = compile(|q| {
        q.add_facet("tag", Some(10)).unwrap();
    });
    assert_eq!(req.facet_fields(), ["tag_foo_facet", "tag_bar_facet"]);
    assert_eq!(req.get("f.tag_foo_facet.facet.limit"), Some("10"));
    assert_eq!(req.get("facet.method"), Some("fc"));
}

#[test]
fn dynamic_filter_excludes_matching_facet() {
    let req = compile(|q| {
        let filter = q.dynamic_filter("tag", "foo", ["x"]).unwrap();
        q.apply(&filter);
        q.add_facet("tag", None).unwrap();
    });
    assert_eq!(req.filter_queries(), ["{!tag=tag_foo}tag_foo_facet:x"]);
    assert_eq!(
        req.facet_fields(),
        ["{!ex=tag_foo}tag_foo_facet", "tag_bar_facet"]
    );
}

#[test]
fn dynamic_keys_are_encoded() {
    let catalog = product_catalog();
    let mut q = QueryBuilder::new(&catalog, live(&[]));
    q.add_dynamic_facet("tag", "new arrivals", None).unwrap();
    let facet = q.assigned_facets().iter().next().unwrap();
    assert_eq!(facet.field, "tag_new_20arrivals_facet");
    assert_eq!(facet.tag, "tag_new_20arrivals");
}

#[test]
fn tag_tokens_become_filters() {
    let req = compile(|q| {
        q.set_query("red shoes #sale").unwrap();
    });
    assert_eq!(req.get("q"), Some("red shoes"));
    assert_eq!(req.filter_queries(), ["tags:sale"]);
}

#[test]
fn minimum_match_rules() {
    let req = compile(|q| {
        q.set_query("red AND blue").unwrap();
    });
    assert!(!req.contains("mm"));

    let req = compile(|q| {
        q.set_query_with_mm("red blue", Some("off")).unwrap();
    });
    assert!(!req.contains("mm"));

    let req = compile(|q| {
        q.set_query_with_mm("red blue", Some("2<75%")).unwrap();
    });
    assert_eq!(req.get("mm"), Some("2<75%"));

    let req = compile(|q| {
        q.set_query_with_mm("red blue", None).unwrap();
    });
    assert!(!req.contains("mm"));
}

#[test]
fn highlighting_follows_free_text() {
    let req = compile(|q| {
        q.set_query("shoes").unwrap();
    });
    assert_eq!(req.get("hl"), Some("true"));
    assert_eq!(req.get("hl.fl"), Some("title_t description_t"));
    assert_eq!(req.get("hl.snippets"), Some("3"));
    assert_eq!(req.get("hl.fragsize"), Some("120"));
    assert_eq!(req.get("hl.requireFieldMatch"), Some("false"));

    let req = compile(|q| {
        q.set_query("shoes").unwrap();
        q.set_highlighting(false);
    });
    assert!(!req.contains("hl"));

    let req = compile(|q| {
        q.set_highlighting(true);
    });
    assert!(!req.contains("hl"));
}

#[test]
fn highlight_fields_follow_directory_refresh() {
    let mut b = CatalogBuilder::new("product");
    b.register_full_text(FullTextTarget::pattern("attr_*_t").unwrap(), 1.0);
    let catalog = b.build();
    let directory = FieldDirectory::default();

    let mut q = QueryBuilder::new(&catalog, directory.snapshot());
    q.set_query("shoes").unwrap();
    assert_eq!(q.build().get("hl.fl"), None);

    directory.refresh(|| Ok::<_, String>(vec!["attr_a_t".into(), "attr_b_t".into()]));
    let mut q = QueryBuilder::new(&catalog, directory.snapshot());
    q.set_query("shoes").unwrap();
    assert_eq!(q.build().get("hl.fl"), Some("attr_a_t attr_b_t"));
}

#[test]
fn field_parameters_are_defaults() {
    let req = compile(|_| {});
    assert_eq!(req.get("f.description_t.hl.snippets"), Some("5"));
}

#[test]
fn relevance_rank_sort() {
    let req = compile(|q| {
        q.set_query("red shoes").unwrap();
    });
    assert_eq!(
        req.get("sort"),
        Some(
            "sum(product(query({!edismax v='red shoes' qf=title_t},0.0001),3),\
             query({!edismax v='red shoes' qf=body_t},0.0001)) desc"
        )
    );
}

#[test]
fn relevance_without_text_or_rows_sorts_by_score() {
    let req = compile(|_| {});
    assert_eq!(req.get("sort"), Some("score desc"));

    let req = compile(|q| {
        q.set_query("red").unwrap();
        q.set_rows(0);
    });
    assert_eq!(req.get("sort"), Some("score desc"));
}

#[test]
fn named_sort_in_order() {
    let req = compile(|q| {
        q.set_query("red").unwrap();
        q.set_sorting("newest").unwrap();
    });
    assert_eq!(req.get("sort"), Some("created_dt desc,id_l asc"));
}

#[test]
fn facets_by_type_and_all() {
    let req = compile(|q| {
        q.add_facets_by_type(&ValueType::Text, Some(5)).unwrap();
    });
    assert_eq!(req.facet_fields(), ["color_s", "size_s", "brand_s"]);
    assert_eq!(req.get("facet.method"), Some("enum"));
    assert_eq!(req.get("f.brand_s.facet.method"), Some("fc"));

    let req = compile(|q| {
        q.add_all_facets();
    });
    assert_eq!(req.facet_fields().len(), 3);
}

#[test]
fn direct_facet_and_filter() {
    let req = compile(|q| {
        let filter = q.direct_filter("stock_i", "stock", [0]).unwrap().negated();
        q.apply(&filter);
        q.add_direct_facet("stock_i", "stock", Hint::OnlyCount, None);
    });
    assert_eq!(req.filter_queries(), ["{!tag=stock}-stock_i:0"]);
    assert_eq!(req.facet_fields(), ["{!ex=stock}stock_i"]);
    assert_eq!(req.get("f.stock_i.facet.exists"), Some("true"));
}

#[test]
fn raw_and_user_defined_filters() {
    let req = compile(|q| {
        q.apply_raw("price_f:[1 TO 5]");
        q.add_user_defined_filter("$description:boots").unwrap();
        q.apply(&Filter::raw("in_stock_b:true").uncached());
    });
    assert_eq!(
        req.filter_queries(),
        [
            "price_f:[1 TO 5]",
            "description_t:boots",
            "{!cache=false}in_stock_b:true"
        ]
    );
}

#[test]
fn unknown_dynamic_facet() {
    let catalog = product_catalog();
    let mut q = QueryBuilder::new(&catalog, live(&[]));
    assert_eq!(
        q.add_dynamic_facet("attr", "x", None).unwrap_err(),
        QueryError::UnknownFacet("attr".into())
    );
}

#[test]
fn serializes_for_transport() {
    let req = compile(|q| {
        q.apply_filter("color", ["red"]).unwrap();
    });
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["fq"][0], "{!tag=color}color_s:red");
    assert_eq!(json["q"][0], "*:*");
}
