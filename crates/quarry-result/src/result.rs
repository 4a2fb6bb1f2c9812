//! Typed search results.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use quarry_catalog::{DynamicFacetDescriptor, FacetDescriptor, FacetValue, ValueType};
use serde::Serialize;
use tracing::warn;

use crate::HighlightedText;

/// One counted facet value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetItem {
    /// The decoded value.
    pub value: FacetValue,
    /// Number of matching documents.
    pub count: u64,
}

/// Finds the item whose value equals `value`.
fn find_item<'a>(items: &'a [FacetItem], value: &FacetValue) -> Option<&'a FacetItem> {
    items.iter().find(|item| &item.value == value)
}

/// Counts of one static facet.
#[derive(Debug, Clone, Serialize)]
pub struct FacetResult {
    /// Backend field.
    field: String,
    /// Facet tag.
    tag: String,
    /// Counted values in engine order.
    items: Vec<FacetItem>,
    /// The facet's catalog entry.
    #[serde(skip)]
    descriptor: Arc<FacetDescriptor>,
}

impl FacetResult {
    /// Creates a result for `descriptor`.
    pub fn new(descriptor: Arc<FacetDescriptor>, items: Vec<FacetItem>) -> Self {
        Self {
            field: descriptor.field().to_string(),
            tag: descriptor.tag().to_string(),
            items,
            descriptor,
        }
    }

    /// The facet's catalog entry.
    pub fn descriptor(&self) -> &Arc<FacetDescriptor> {
        &self.descriptor
    }

    /// Backend field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Facet tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Counted values.
    pub fn items(&self) -> &[FacetItem] {
        &self.items
    }

    /// The count of `value`, if it was returned.
    pub fn item_by_value(&self, value: &FacetValue) -> Option<&FacetItem> {
        find_item(&self.items, value)
    }
}

/// Counts of one field of a dynamic facet family.
#[derive(Debug, Clone, Serialize)]
pub struct DynamicFacetResult {
    /// Group of the family.
    group: String,
    /// The decoded key the wildcard matched.
    name: String,
    /// Backend field.
    field: String,
    /// Counted values in engine order.
    items: Vec<FacetItem>,
    /// The family's catalog entry.
    #[serde(skip)]
    descriptor: Arc<DynamicFacetDescriptor>,
}

impl DynamicFacetResult {
    /// Creates a result for the field `field` of family `descriptor`.
    pub fn new(
        descriptor: Arc<DynamicFacetDescriptor>,
        field: String,
        name: String,
        items: Vec<FacetItem>,
    ) -> Self {
        Self {
            group: descriptor.group().to_string(),
            name,
            field,
            items,
            descriptor,
        }
    }

    /// The family's catalog entry.
    pub fn descriptor(&self) -> &Arc<DynamicFacetDescriptor> {
        &self.descriptor
    }

    /// Group of the family.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Decoded key, e.g. `new arrivals` for `tag_new_20arrivals_facet`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Counted values.
    pub fn items(&self) -> &[FacetItem] {
        &self.items
    }

    /// The count of `value`, if it was returned.
    pub fn item_by_value(&self, value: &FacetValue) -> Option<&FacetItem> {
        find_item(&self.items, value)
    }
}

/// A suggested alternative query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DidYouMean {
    /// The alternative query text.
    pub query: String,
    /// Estimated number of hits.
    pub hits: u64,
}

/// One returned document.
#[derive(Debug, Clone, Serialize)]
pub struct ResultItem<T> {
    /// Document id, if the document had one.
    pub id: Option<String>,
    /// The mapped item.
    pub item: T,
    /// Highlighted stored values per field.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub texts: BTreeMap<String, Vec<HighlightedText>>,
}

/// A decoded page of results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<T> {
    /// Total number of matching documents.
    hit_count: u64,
    /// Items of the page in engine order.
    items: Vec<ResultItem<T>>,
    /// Item positions by id.
    #[serde(skip)]
    by_id: HashMap<String, usize>,
    /// Static facet results.
    facets: Vec<FacetResult>,
    /// Static facet positions by category.
    #[serde(skip)]
    by_category: HashMap<String, usize>,
    /// Dynamic facet results.
    dynamic_facets: Vec<DynamicFacetResult>,
    /// Alternative queries, most hits first.
    did_you_mean: Vec<DidYouMean>,
}

impl<T> SearchResult<T> {
    /// Creates an empty result.
    pub fn new(hit_count: u64) -> Self {
        Self {
            hit_count,
            items: Vec::new(),
            by_id: HashMap::new(),
            facets: Vec::new(),
            by_category: HashMap::new(),
            dynamic_facets: Vec::new(),
            did_you_mean: Vec::new(),
        }
    }

    /// Total number of matching documents.
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    /// Items of the page.
    pub fn items(&self) -> &[ResultItem<T>] {
        &self.items
    }

    /// Consumes the result, keeping only the mapped items.
    pub fn into_items(self) -> Vec<T> {
        self.items.into_iter().map(|i| i.item).collect()
    }

    /// The item with document id `id`.
    pub fn item_by_id(&self, id: &str) -> Option<&ResultItem<T>> {
        self.by_id.get(id).map(|&index| &self.items[index])
    }

    /// The facet result of `category`.
    pub fn facet(&self, category: &str) -> Option<&FacetResult> {
        self.by_category.get(category).map(|&index| &self.facets[index])
    }

    /// Every static facet result.
    pub fn facets(&self) -> &[FacetResult] {
        &self.facets
    }

    /// Static facet results decoding into `value_type`.
    pub fn facets_by_type<'a>(
        &'a self,
        value_type: &'a ValueType,
    ) -> impl Iterator<Item = &'a FacetResult> + 'a {
        self.facets
            .iter()
            .filter(move |f| f.descriptor.value_type() == value_type)
    }

    /// Every dynamic facet result.
    pub fn dynamic_facets(&self) -> &[DynamicFacetResult] {
        &self.dynamic_facets
    }

    /// Alternative queries, most hits first.
    pub fn did_you_mean(&self) -> &[DidYouMean] {
        &self.did_you_mean
    }

    /// Appends an item.
    pub(crate) fn push_item(&mut self, item: ResultItem<T>) {
        if let Some(id) = &item.id {
            self.by_id.insert(id.clone(), self.items.len());
        }
        self.items.push(item);
    }

    /// Item at `index`.
    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut ResultItem<T>> {
        self.items.get_mut(index)
    }

    /// Position of the item with id `id`.
    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Adds a static facet result under each of its categories.
    ///
    /// A category already taken by an earlier result keeps it.
    pub(crate) fn add_facet(&mut self, facet: FacetResult) {
        let index = self.facets.len();
        for category in facet.descriptor.categories() {
            if let Some(&existing) = self.by_category.get(category) {
                warn!(
                    category = %category,
                    field = facet.field(),
                    existing = self.facets[existing].field(),
                    "facet category already registered"
                );
                continue;
            }
            self.by_category.insert(category.clone(), index);
        }
        self.facets.push(facet);
    }

    /// Adds a dynamic facet result.
    pub(crate) fn add_dynamic_facet(&mut self, facet: DynamicFacetResult) {
        self.dynamic_facets.push(facet);
    }

    /// Sets the alternative queries.
    pub(crate) fn set_did_you_mean(&mut self, did_you_mean: Vec<DidYouMean>) {
        self.did_you_mean = did_you_mean;
    }
}
