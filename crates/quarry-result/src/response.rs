//! The raw engine response, as handed over by the transport.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::ResultError;

/// Snippets per field per document id.
pub type Highlighting = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Counted values of one facet field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetField {
    /// Backend field name.
    pub name: String,
    /// `(raw value, count)` pairs in engine order.
    pub values: Vec<(String, u64)>,
}

/// A spelling-corrected alternative query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collation {
    /// The alternative query text.
    pub query: String,
    /// Estimated number of hits.
    pub hits: u64,
}

/// One engine response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineResponse {
    /// Total number of matching documents.
    pub num_found: u64,
    /// Returned documents of the current page.
    pub docs: Vec<JsonValue>,
    /// Facet counts.
    pub facet_fields: Vec<FacetField>,
    /// Highlight snippets: document id, then field, then snippets in order.
    pub highlighting: Highlighting,
    /// Spelling collations.
    pub collations: Vec<Collation>,
}

/// Top level of the engine's native JSON response.
#[derive(Debug, Deserialize)]
struct NativeResponse {
    /// Hit count and documents.
    response: NativeDocList,
    /// Facet counts, if faceting was requested.
    #[serde(default)]
    facet_counts: NativeFacetCounts,
    /// Highlighting, if requested.
    #[serde(default)]
    highlighting: Highlighting,
    /// Spellcheck section, if requested.
    #[serde(default)]
    spellcheck: NativeSpellcheck,
}

/// Native document list.
#[derive(Debug, Deserialize)]
struct NativeDocList {
    /// Total hit count.
    #[serde(rename = "numFound")]
    num_found: u64,
    /// Documents of the page.
    #[serde(default)]
    docs: Vec<JsonValue>,
}

/// Native facet section.
#[derive(Debug, Default, Deserialize)]
struct NativeFacetCounts {
    /// Field name to a flat `[value, count, value, count]` list.
    #[serde(default)]
    facet_fields: Map<String, JsonValue>,
}

/// Native spellcheck section.
#[derive(Debug, Default, Deserialize)]
struct NativeSpellcheck {
    /// Flat `["collation", <collation>, ...]` list.
    #[serde(default)]
    collations: Vec<JsonValue>,
}

impl EngineResponse {
    /// Parses the engine's native JSON response layout.
    ///
    /// Facet lists may be flat (`["red", 3, "blue", 1]`) or pairs (`[["red", 3]]`).
    /// Collations may be bare query strings or extended objects carrying
    /// `collationQuery` and `hits`. Malformed facet entries are skipped with a warning.
    pub fn from_solr_json(text: &str) -> Result<Self, ResultError> {
        let native: NativeResponse = serde_json::from_str(text)?;
        let facet_fields = native
            .facet_counts
            .facet_fields
            .into_iter()
            .map(|(name, counts)| {
                let values = facet_pairs(&name, &counts);
                FacetField { name, values }
            })
            .collect();
        Ok(Self {
            num_found: native.response.num_found,
            docs: native.response.docs,
            facet_fields,
            highlighting: native.highlighting,
            collations: collations(&native.spellcheck.collations),
        })
    }
}

/// Reads the `(value, count)` pairs of one native facet list.
fn facet_pairs(field: &str, counts: &JsonValue) -> Vec<(String, u64)> {
    let Some(list) = counts.as_array() else {
        warn!(field, "facet counts are not a list");
        return Vec::new();
    };
    let mut pairs = Vec::with_capacity(list.len() / 2);
    if list.first().is_some_and(JsonValue::is_array) {
        for entry in list {
            match entry.as_array().map(Vec::as_slice) {
                Some([value, count]) => push_pair(field, value, count, &mut pairs),
                _ => warn!(field, %entry, "malformed facet entry"),
            }
        }
    } else {
        for chunk in list.chunks(2) {
            match chunk {
                [value, count] => push_pair(field, value, count, &mut pairs),
                _ => warn!(field, "odd number of facet entries"),
            }
        }
    }
    pairs
}

/// Appends one facet pair if the count is a non-negative integer.
fn push_pair(field: &str, value: &JsonValue, count: &JsonValue, pairs: &mut Vec<(String, u64)>) {
    let Some(count) = count.as_u64() else {
        warn!(field, %count, "facet count is not a number");
        return;
    };
    let value = match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    pairs.push((value, count));
}

/// Reads collations from the flat name/value list.
fn collations(list: &[JsonValue]) -> Vec<Collation> {
    list.chunks(2)
        .filter_map(|chunk| match chunk {
            [_, JsonValue::String(query)] => Some(Collation {
                query: query.clone(),
                hits: 0,
            }),
            [_, JsonValue::Object(fields)] => {
                let query = fields.get("collationQuery")?.as_str()?.to_string();
                let hits = fields.get("hits").and_then(JsonValue::as_u64).unwrap_or(0);
                Some(Collation { query, hits })
            }
            _ => None,
        })
        .collect()
}
