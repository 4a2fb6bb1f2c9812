//! Facet and filter catalog for quarry.
//!
//! A [`Catalog`] maps the categories an application talks about (`color`, `tag`) to the
//! backend fields, tags, value types and cardinality hints the search engine needs. One
//! catalog exists per entity type. It is assembled once through [`CatalogBuilder`], or
//! declared in a TOML catalog file and loaded with [`CatalogSet::load`], and is read-only
//! afterwards.
//!
//! ```toml
//! [[entity.product.facet]]
//! field = "color_s"
//! tag = "color"
//! hint = "small"
//! categories = ["color", "colour"]
//!
//! [[entity.product.dynamic_facet]]
//! field = "tag_*_facet"
//! categories = "tag_*"
//! ```
//!
//! Dynamic facets are resolved against the engine's live field names, held by a
//! [`FieldDirectory`].

#![warn(missing_docs)]

mod builder;
mod catalog;
mod descriptor;
mod directory;
mod error;
mod key;
mod parse;
mod pattern;
mod set;
mod value;

pub use builder::CatalogBuilder;
pub use catalog::{
    Catalog, DEFAULT_SNIPPETS, FullTextField, RELEVANCE, RankField, SortDirection, SortField,
};
pub use descriptor::{
    DynamicCandidate, DynamicFacetDescriptor, FacetDescriptor, FilterDescriptor, Hint, ValueRange,
};
pub use directory::{FieldDirectory, REFRESH_ATTEMPTS};
pub use error::{CatalogError, DecodeError};
pub use key::{decode_key, encode_key};
pub use parse::{
    RawCatalogFile, RawDynamicFacet, RawEntity, RawFacet, RawFilter, RawFullText, RawRank,
    RawSort, RawTextTarget, RawValue, parse_catalog_file, parse_catalog_str,
};
pub use pattern::{FullTextTarget, WILDCARD, WildcardPattern, strip_wildcard};
pub use set::CatalogSet;
pub use value::{FacetValue, NoRelations, RelationResolver, ValueType};
