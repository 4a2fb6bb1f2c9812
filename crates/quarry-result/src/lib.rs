//! Result decoding for quarry.
//!
//! A [`ResultDecoder`] turns one [`EngineResponse`] into a typed [`SearchResult`]: items
//! mapped through a [`DocumentMapper`], facet counts decoded through the catalog's value
//! types, highlight snippets distributed over each document's stored values, and
//! spelling suggestions.
//!
//! ```
//! use quarry_catalog::{CatalogBuilder, Hint};
//! use quarry_query::BackendRequest;
//! use quarry_result::{EngineResponse, JsonDocumentMapper, ResultDecoder};
//!
//! let mut catalog = CatalogBuilder::new("product");
//! catalog
//!     .register_string_facet("color_s", "color", Hint::Small, ["color"])
//!     .unwrap();
//! let catalog = catalog.build();
//!
//! let response = EngineResponse::from_solr_json(
//!     r#"{"response": {"numFound": 1, "docs": [{"id": "1"}]},
//!         "facet_counts": {"facet_fields": {"color_s": ["red", 1]}}}"#,
//! )
//! .unwrap();
//! let decoder = ResultDecoder::new(&catalog, JsonDocumentMapper::default());
//! let result = decoder.decode(&BackendRequest::default(), response).unwrap();
//! assert_eq!(result.facet("color").unwrap().items()[0].count, 1);
//! ```

#![warn(missing_docs)]

mod decoder;
mod error;
mod highlight;
mod mapper;
mod response;
mod result;

pub use decoder::{MIN_COLLATION_HITS, ResultDecoder, did_you_mean};
pub use error::ResultError;
pub use highlight::{EMPHASIS, HighlightedText, Regrouped, regroup};
pub use mapper::{DEFAULT_ID_FIELD, DocumentMapper, JsonDocumentMapper, SerdeDocumentMapper};
pub use response::{Collation, EngineResponse, FacetField, Highlighting};
pub use result::{
    DidYouMean, DynamicFacetResult, FacetItem, FacetResult, ResultItem, SearchResult,
};
