//! Query compiler for quarry.
//!
//! A [`QueryBuilder`] collects one search against a [`Catalog`](quarry_catalog::Catalog):
//! free text, filters by category, facets to count, a sort key, highlighting and paging.
//! [`QueryBuilder::build`] consumes it and produces a [`BackendRequest`], the ordered
//! parameter list handed to the search engine transport.
//!
//! Facets are computed over the result set *without* their own filter. Every applied
//! filter records its tag; at build time each facet whose tag was filtered is emitted as
//! `{!ex=<tag>}<field>`, so narrowing by `color:red` still shows every colour's count.

#![warn(missing_docs)]

mod compiler;
mod error;
mod facets;
mod request;
mod sort;
mod suggest;
mod text;

pub use compiler::{
    DEFAULT_FRAGMENT_SIZE, DEFAULT_MINIMUM_MATCH, DEFAULT_ROWS, DEFAULT_SLOP, MAX_COLLATION_TRIES,
    MINIMUM_MATCH_OFF, PHRASE_WEIGHT, QUERY_FIELDS, QueryBuilder, TAGS_FIELD,
};
pub use error::QueryError;
pub use facets::{AssignedFacet, AssignedFacets};
pub use request::{BackendRequest, SELECT_HANDLER};
pub use sort::{MATCH_ALL, field_sort, is_free_text, plain_query, scoring_function};
pub use suggest::{SuggestRequest, TERMS_HANDLER, suggest_request};
pub use text::{extract_tags, fields_with_weight, is_quoted, replace_aliases};
