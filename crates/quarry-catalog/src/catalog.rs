//! The frozen, read-only catalog of one entity type.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use serde::Deserialize;

use crate::{
    DynamicFacetDescriptor, FacetDescriptor, FilterDescriptor, ValueType, pattern::FullTextTarget,
};

/// Snippets per highlighted value unless a field overrides `hl.snippets`.
pub const DEFAULT_SNIPPETS: usize = 3;

/// The sort key every catalog knows.
pub const RELEVANCE: &str = "relevance";

/// Sort direction of one sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The engine's direction keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a named sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Backend field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
    /// Position within the sort key, ascending.
    pub order: u32,
}

/// A field consulted by the generated relevance sort function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankField {
    /// Backend field name.
    pub field: String,
    /// Integer weight; higher weights come first, above 1 they multiply the clause.
    pub weight: u32,
}

/// A free-text target with its relevancy weight.
#[derive(Debug, Clone)]
pub struct FullTextField {
    /// The searched field or glob.
    pub target: FullTextTarget,
    /// Relevancy weight.
    pub weight: f32,
}

/// Everything known about one entity type's fields, filters and facets.
///
/// Built once by [`CatalogBuilder`](crate::CatalogBuilder) and read-only afterwards; a
/// catalog can be shared between request threads behind an `Arc`.
#[derive(Debug)]
pub struct Catalog {
    /// Entity type name.
    pub(crate) entity: String,
    /// Filters by category.
    pub(crate) filters: HashMap<String, Arc<FilterDescriptor>>,
    /// Distinct filters in registration order.
    pub(crate) filter_list: Vec<Arc<FilterDescriptor>>,
    /// Static facets in registration order.
    pub(crate) facets: Vec<Arc<FacetDescriptor>>,
    /// Static facets by category.
    pub(crate) facets_by_category: HashMap<String, Arc<FacetDescriptor>>,
    /// Static facets by backend field name.
    pub(crate) facets_by_field: HashMap<String, Arc<FacetDescriptor>>,
    /// Static facets by value type.
    pub(crate) facets_by_type: HashMap<ValueType, Vec<Arc<FacetDescriptor>>>,
    /// Dynamic facet families in registration order, unique by group.
    pub(crate) dynamic: Vec<Arc<DynamicFacetDescriptor>>,
    /// Indexed fields and their per-field request parameters.
    pub(crate) fields: BTreeMap<String, BTreeMap<String, String>>,
    /// Field aliases for user-defined filters.
    pub(crate) aliases: HashMap<String, String>,
    /// Free-text targets, descending by weight.
    pub(crate) full_text: Vec<FullTextField>,
    /// Relevance rank fields, descending by weight.
    pub(crate) rank: Vec<RankField>,
    /// Sort keys, each ascending by order.
    pub(crate) sorts: BTreeMap<String, Vec<SortField>>,
    /// Memoized weighted full-text field list.
    pub(crate) weighted: SnapshotMemo,
    /// Memoized highlight field list.
    pub(crate) highlight: SnapshotMemo,
}

impl Catalog {
    /// Entity type name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Filter registered for `category`.
    pub fn filter(&self, category: &str) -> Option<&Arc<FilterDescriptor>> {
        self.filters.get(category)
    }

    /// Every distinct filter in registration order.
    pub fn filters(&self) -> &[Arc<FilterDescriptor>] {
        &self.filter_list
    }

    /// Static facet registered for `category`.
    pub fn facet_by_category(&self, category: &str) -> Option<&Arc<FacetDescriptor>> {
        self.facets_by_category.get(category)
    }

    /// Static facet on backend field `field`.
    pub fn facet_by_field(&self, field: &str) -> Option<&Arc<FacetDescriptor>> {
        self.facets_by_field.get(field)
    }

    /// Static facets decoding into `value_type`, or `None` if there are none.
    pub fn facets_by_type(&self, value_type: &ValueType) -> Option<&[Arc<FacetDescriptor>]> {
        self.facets_by_type.get(value_type).map(Vec::as_slice)
    }

    /// Every static facet in registration order.
    pub fn all_facets(&self) -> &[Arc<FacetDescriptor>] {
        &self.facets
    }

    /// Every dynamic facet family in registration order.
    pub fn dynamic_facets(&self) -> &[Arc<DynamicFacetDescriptor>] {
        &self.dynamic
    }

    /// Dynamic facet family named `group`.
    pub fn dynamic_by_group(&self, group: &str) -> Option<&Arc<DynamicFacetDescriptor>> {
        self.dynamic.iter().find(|d| d.group() == group)
    }

    /// Dynamic facet family listing `category`.
    pub fn dynamic_by_category(&self, category: &str) -> Option<&Arc<DynamicFacetDescriptor>> {
        self.dynamic.iter().find(|d| d.contains(category))
    }

    /// First dynamic facet family whose pattern matches `field`, with the extracted key.
    pub fn dynamic_for_field<'f>(
        &self,
        field: &'f str,
    ) -> Option<(&Arc<DynamicFacetDescriptor>, &'f str)> {
        self.dynamic
            .iter()
            .find_map(|d| d.extract_key(field).map(|key| (d, key)))
    }

    /// Backend field behind `alias`.
    pub fn field_for_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Indexed fields and their per-field request parameters.
    pub fn fields(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.fields
    }

    /// Highlight snippets per stored value of `field`.
    pub fn snippet_count(&self, field: &str) -> usize {
        self.fields
            .get(field)
            .and_then(|params| params.get("hl.snippets"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SNIPPETS)
    }

    /// Fields of sort key `key`, ascending by order.
    pub fn sort(&self, key: &str) -> Option<&[SortField]> {
        self.sorts.get(key).map(Vec::as_slice)
    }

    /// Every sort key, alphabetically.
    pub fn sort_keys(&self) -> impl Iterator<Item = &str> {
        self.sorts.keys().map(String::as_str)
    }

    /// Relevance rank fields, descending by weight.
    pub fn rank_fields(&self) -> &[RankField] {
        &self.rank
    }

    /// Free-text targets, descending by weight.
    pub fn full_text(&self) -> &[FullTextField] {
        &self.full_text
    }

    /// Weighted free-text field list, e.g. `title_t^2 body_t`.
    ///
    /// Glob targets expand against `live_fields`. The list is computed once per
    /// snapshot and reused until a different snapshot is passed.
    pub fn weighted_fields(&self, live_fields: &Arc<[String]>) -> Arc<str> {
        self.weighted.get_or_compute(live_fields, |live| {
            let mut tokens = Vec::new();
            for ft in &self.full_text {
                let mut names = Vec::new();
                ft.target.names_into(live, &mut names);
                for name in names {
                    if (ft.weight - 1.0).abs() < f32::EPSILON {
                        tokens.push(name.to_string());
                    } else {
                        tokens.push(format!("{name}^{}", ft.weight));
                    }
                }
            }
            tokens.join(" ")
        })
    }

    /// Unweighted free-text field list used for highlighting.
    ///
    /// Memoized per snapshot like [`weighted_fields`](Self::weighted_fields).
    pub fn highlight_fields(&self, live_fields: &Arc<[String]>) -> Arc<str> {
        self.highlight.get_or_compute(live_fields, |live| {
            let mut names = Vec::new();
            for ft in &self.full_text {
                ft.target.names_into(live, &mut names);
            }
            names.join(" ")
        })
    }
}

/// A derived string cached for the live-field snapshot it was computed from.
///
/// Snapshots are compared by identity: the directory publishes a new `Arc` on every
/// refresh, so a stale or empty fallback list is never kept past the next refresh.
#[derive(Debug, Default)]
pub struct SnapshotMemo {
    /// The snapshot and the value derived from it.
    cached: RwLock<Option<(Arc<[String]>, Arc<str>)>>,
}

impl SnapshotMemo {
    /// Returns the value for `live_fields`, computing it if the snapshot changed.
    fn get_or_compute<F>(&self, live_fields: &Arc<[String]>, compute: F) -> Arc<str>
    where
        F: FnOnce(&[String]) -> String,
    {
        {
            let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((snapshot, value)) = cached.as_ref()
                && Arc::ptr_eq(snapshot, live_fields)
            {
                return Arc::clone(value);
            }
        }
        let value: Arc<str> = compute(live_fields).into();
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) =
            Some((Arc::clone(live_fields), Arc::clone(&value)));
        value
    }
}
