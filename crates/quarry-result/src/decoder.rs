//! Decoding engine responses against a catalog.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use quarry_catalog::{Catalog, NoRelations, RelationResolver, ValueType, decode_key};
use quarry_query::{BackendRequest, DEFAULT_ROWS};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::{
    Collation, DidYouMean, DocumentMapper, DynamicFacetResult, EngineResponse, FacetField,
    FacetItem, FacetResult, HighlightedText, ResultError, ResultItem, SearchResult,
    highlight::regroup, response::Highlighting,
};

/// Collations need strictly more estimated hits than this to be suggested.
pub const MIN_COLLATION_HITS: u64 = 20;

/// Decodes responses for one entity type.
pub struct ResultDecoder<'a, M> {
    /// Catalog resolving facet fields and snippet counts.
    catalog: &'a Catalog,
    /// Maps documents into items.
    mapper: M,
    /// Resolves relation facet values.
    relations: &'a dyn RelationResolver,
}

impl<'a, M: DocumentMapper> ResultDecoder<'a, M> {
    /// Creates a decoder that rejects relation facet values.
    pub fn new(catalog: &'a Catalog, mapper: M) -> Self {
        Self {
            catalog,
            mapper,
            relations: &NoRelations,
        }
    }

    /// Resolves relation facet values through `relations`.
    #[must_use]
    pub fn with_relations(mut self, relations: &'a dyn RelationResolver) -> Self {
        self.relations = relations;
        self
    }

    /// Decodes `response`, the answer to `request`.
    ///
    /// Only a document that cannot be mapped fails the whole response. Unknown facet
    /// fields, undecodable facet values and misaligned highlighting are logged and
    /// skipped.
    pub fn decode(
        &self,
        request: &BackendRequest,
        response: EngineResponse,
    ) -> Result<SearchResult<M::Item>, ResultError> {
        let EngineResponse {
            num_found,
            docs,
            facet_fields,
            highlighting,
            collations,
        } = response;

        let mut result = SearchResult::new(num_found);
        for doc in &docs {
            let id = self.mapper.id(doc);
            if id.is_none() {
                warn!(entity = self.catalog.entity(), "document without id");
            }
            result.push_item(ResultItem {
                id,
                item: self.mapper.map(doc)?,
                texts: BTreeMap::new(),
            });
        }

        self.add_facets(&mut result, &facet_fields);
        self.add_highlighting(&mut result, &docs, &highlighting);
        if request.rows().unwrap_or(DEFAULT_ROWS) > 0 {
            result.set_did_you_mean(did_you_mean(collations));
        }

        debug!(
            entity = self.catalog.entity(),
            hits = result.hit_count(),
            items = result.items().len(),
            facets = result.facets().len(),
            dynamic_facets = result.dynamic_facets().len(),
            "response decoded"
        );
        Ok(result)
    }

    /// Matches every facet field to a static facet, then to a dynamic family.
    fn add_facets(&self, result: &mut SearchResult<M::Item>, fields: &[FacetField]) {
        for facet in fields {
            if let Some(descriptor) = self.catalog.facet_by_field(&facet.name) {
                let items = self.decode_counts(descriptor.value_type(), facet);
                result.add_facet(FacetResult::new(Arc::clone(descriptor), items));
            } else if let Some((descriptor, key)) = self.catalog.dynamic_for_field(&facet.name) {
                let items = self.decode_counts(descriptor.value_type(), facet);
                result.add_dynamic_facet(DynamicFacetResult::new(
                    Arc::clone(descriptor),
                    facet.name.clone(),
                    decode_key(key),
                    items,
                ));
            } else {
                warn!(field = %facet.name, "no such facet field");
            }
        }
    }

    /// Decodes the counted values of one facet, dropping values that fail to decode.
    fn decode_counts(&self, value_type: &ValueType, facet: &FacetField) -> Vec<FacetItem> {
        facet
            .values
            .iter()
            .filter_map(|(raw, count)| match value_type.decode(raw, self.relations) {
                Ok(value) => Some(FacetItem {
                    value,
                    count: *count,
                }),
                Err(e) => {
                    warn!(field = %facet.name, error = %e, "dropping facet value");
                    None
                }
            })
            .collect()
    }

    /// Distributes each document's snippets over its stored values.
    fn add_highlighting(
        &self,
        result: &mut SearchResult<M::Item>,
        docs: &[JsonValue],
        highlighting: &Highlighting,
    ) {
        for (id, fields) in highlighting {
            let Some(index) = result.index_of(id) else {
                warn!(%id, "highlighting for unknown document");
                continue;
            };
            let Some(doc) = docs.get(index) else {
                continue;
            };
            let mut texts = BTreeMap::new();
            for (field, snippets) in fields {
                let values = self.mapper.stored_values(doc, field);
                if values.is_empty() {
                    debug!(%id, %field, "no stored values to highlight");
                    continue;
                }
                let window = self.catalog.snippet_count(field);
                let regrouped = regroup(values.len(), snippets, window);
                if regrouped.overflow {
                    warn!(
                        %id,
                        %field,
                        values = values.len(),
                        snippets = snippets.len(),
                        "not enough stored values for highlighting"
                    );
                }
                let highlighted: Vec<HighlightedText> = values
                    .into_iter()
                    .zip(regrouped.per_value)
                    .map(|(text, snippets)| HighlightedText { text, snippets })
                    .collect();
                texts.insert(field.clone(), highlighted);
            }
            if let Some(item) = result.item_mut(index) {
                item.texts = texts;
            }
        }
    }
}

/// Keeps collations above [`MIN_COLLATION_HITS`], unique by query, most hits first.
///
/// Among equal hit counts the engine's order is kept, and a repeated query keeps its
/// first occurrence.
pub fn did_you_mean(collations: Vec<Collation>) -> Vec<DidYouMean> {
    let mut seen = HashSet::new();
    let mut out: Vec<DidYouMean> = collations
        .into_iter()
        .filter(|c| c.hits > MIN_COLLATION_HITS && seen.insert(c.query.clone()))
        .map(|c| DidYouMean {
            query: c.query,
            hits: c.hits,
        })
        .collect();
    out.sort_by(|a, b| b.hits.cmp(&a.hits));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collation(query: &str, hits: u64) -> Collation {
        Collation {
            query: query.into(),
            hits,
        }
    }

    #[test]
    fn threshold_is_exclusive() {
        let dym = did_you_mean(vec![collation("a", 20), collation("b", 21)]);
        assert_eq!(dym.len(), 1);
        assert_eq!(dym[0].query, "b");
    }

    #[test]
    fn sorted_and_deduplicated() {
        let dym = did_you_mean(vec![
            collation("red shoe", 30),
            collation("rod shoes", 90),
            collation("red shoe", 500),
            collation("rad shoes", 30),
        ]);
        let queries: Vec<_> = dym.iter().map(|d| (d.query.as_str(), d.hits)).collect();
        assert_eq!(
            queries,
            vec![("rod shoes", 90), ("red shoe", 30), ("rad shoes", 30)]
        );
    }
}
