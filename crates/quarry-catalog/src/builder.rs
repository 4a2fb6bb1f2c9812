//! Registration API that assembles a [`Catalog`].

use std::{
    collections::{BTreeMap, HashMap},
    iter,
    sync::Arc,
};

use tracing::debug;

use crate::{
    Catalog, CatalogError, DynamicFacetDescriptor, FacetDescriptor, FilterDescriptor, FullTextField,
    FullTextTarget, Hint, RELEVANCE, RankField, SortDirection, SortField, ValueType,
    catalog::SnapshotMemo,
};

/// Collects registrations for one entity type and freezes them into a [`Catalog`].
///
/// Within each lookup table the first registration claiming a name wins; later
/// registrations never overwrite it.
#[derive(Debug)]
pub struct CatalogBuilder {
    /// Entity type name.
    entity: String,
    /// Filters by category.
    filters: HashMap<String, Arc<FilterDescriptor>>,
    /// Distinct filters in registration order.
    filter_list: Vec<Arc<FilterDescriptor>>,
    /// Static facets in registration order.
    facets: Vec<Arc<FacetDescriptor>>,
    /// Static facets by category.
    facets_by_category: HashMap<String, Arc<FacetDescriptor>>,
    /// Static facets by backend field name.
    facets_by_field: HashMap<String, Arc<FacetDescriptor>>,
    /// Static facets by value type.
    facets_by_type: HashMap<ValueType, Vec<Arc<FacetDescriptor>>>,
    /// Dynamic facet families, unique by group.
    dynamic: Vec<Arc<DynamicFacetDescriptor>>,
    /// Indexed fields and their parameters.
    fields: BTreeMap<String, BTreeMap<String, String>>,
    /// Field aliases.
    aliases: HashMap<String, String>,
    /// Free-text targets in registration order.
    full_text: Vec<FullTextField>,
    /// Rank fields in registration order.
    rank: Vec<RankField>,
    /// Sort keys in registration order.
    sorts: BTreeMap<String, Vec<SortField>>,
}

impl CatalogBuilder {
    /// Starts a catalog for `entity`. The `relevance` sort key is preset to `score desc`.
    pub fn new(entity: impl Into<String>) -> Self {
        let mut sorts = BTreeMap::new();
        sorts.insert(
            RELEVANCE.to_string(),
            vec![SortField {
                field: "score".into(),
                direction: SortDirection::Desc,
                order: 1,
            }],
        );
        Self {
            entity: entity.into(),
            filters: HashMap::new(),
            filter_list: Vec::new(),
            facets: Vec::new(),
            facets_by_category: HashMap::new(),
            facets_by_field: HashMap::new(),
            facets_by_type: HashMap::new(),
            dynamic: Vec::new(),
            fields: BTreeMap::new(),
            aliases: HashMap::new(),
            full_text: Vec::new(),
            rank: Vec::new(),
            sorts,
        }
    }

    /// Registers a filter under `categories`.
    ///
    /// If every category is already claimed, the descriptor of the first one is returned
    /// unchanged. Otherwise a new descriptor claims the unclaimed categories.
    pub fn register_filter<I, S>(
        &mut self,
        field: &str,
        tag: &str,
        value_type: ValueType,
        categories: I,
    ) -> Result<Arc<FilterDescriptor>, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        let Some(first) = categories.first() else {
            return Err(CatalogError::NoCategories {
                field: field.to_string(),
            });
        };
        if let Some(existing) = self.filters.get(first)
            && categories.iter().all(|c| self.filters.contains_key(c))
        {
            return Ok(Arc::clone(existing));
        }

        let descriptor = Arc::new(FilterDescriptor::new(
            field,
            tag,
            value_type,
            categories.iter().cloned(),
        ));
        for category in categories {
            self.filters
                .entry(category)
                .or_insert_with(|| Arc::clone(&descriptor));
        }
        self.filter_list.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Registers a static facet and a filter on the same field.
    pub fn register_facet(
        &mut self,
        descriptor: FacetDescriptor,
    ) -> Result<Arc<FacetDescriptor>, CatalogError> {
        if descriptor.categories().is_empty() {
            return Err(CatalogError::NoCategories {
                field: descriptor.field().to_string(),
            });
        }
        let facet = Arc::new(descriptor);
        for category in facet.categories() {
            self.facets_by_category
                .entry(category.clone())
                .or_insert_with(|| Arc::clone(&facet));
        }
        self.facets_by_field
            .entry(facet.field().to_string())
            .or_insert_with(|| Arc::clone(&facet));
        self.facets_by_type
            .entry(facet.value_type().clone())
            .or_default()
            .push(Arc::clone(&facet));
        self.facets.push(Arc::clone(&facet));

        self.register_filter(
            facet.field(),
            facet.tag(),
            facet.value_type().clone(),
            facet.categories().iter().cloned(),
        )?;
        debug!(entity = %self.entity, field = facet.field(), tag = facet.tag(), "registered facet");
        Ok(facet)
    }

    /// Registers a text facet, its filter, and the field itself.
    pub fn register_string_facet<I, S>(
        &mut self,
        field: &str,
        tag: &str,
        hint: Hint,
        categories: I,
    ) -> Result<Arc<FacetDescriptor>, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let facet = self.register_facet(FacetDescriptor::new(
            field,
            tag,
            ValueType::Text,
            hint,
            categories,
        ))?;
        self.register_field(field, iter::empty::<String>());
        Ok(facet)
    }

    /// Registers a dynamic facet family.
    ///
    /// `filter_pattern` defaults to `field_pattern`. Fails with
    /// [`CatalogError::InvalidPattern`] unless both contain exactly one wildcard. If the
    /// group is already taken, the existing family is returned.
    pub fn register_dynamic_facet<I, S>(
        &mut self,
        value_type: ValueType,
        field_pattern: &str,
        filter_pattern: Option<&str>,
        hint: Hint,
        categories: I,
    ) -> Result<Arc<DynamicFacetDescriptor>, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let descriptor = DynamicFacetDescriptor::new(
            value_type,
            field_pattern,
            filter_pattern.unwrap_or(field_pattern),
            hint,
            categories,
        )?;
        if let Some(existing) = self.dynamic.iter().find(|d| d.group() == descriptor.group()) {
            return Ok(Arc::clone(existing));
        }
        let descriptor = Arc::new(descriptor);
        debug!(
            entity = %self.entity,
            group = descriptor.group(),
            pattern = descriptor.field_pattern().as_str(),
            "registered dynamic facet"
        );
        self.dynamic.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Registers an indexed field and its aliases.
    pub fn register_field<I, S>(&mut self, field: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.entry(field.to_string()).or_default();
        for alias in aliases {
            self.aliases.insert(alias.into(), field.to_string());
        }
    }

    /// Sets a per-field request parameter, sent as `f.<field>.<param>`.
    pub fn field_parameter(
        &mut self,
        field: &str,
        param: &str,
        value: impl ToString,
    ) -> Result<(), CatalogError> {
        let params = self
            .fields
            .get_mut(field)
            .ok_or_else(|| CatalogError::UnknownField {
                field: field.to_string(),
            })?;
        params.insert(param.to_string(), value.to_string());
        Ok(())
    }

    /// Registers a free-text target. A target already registered keeps its first weight.
    pub fn register_full_text(&mut self, target: FullTextTarget, weight: f32) {
        if self
            .full_text
            .iter()
            .any(|ft| ft.target.as_str() == target.as_str())
        {
            return;
        }
        self.full_text.push(FullTextField { target, weight });
    }

    /// Registers a field for the generated relevance sort function.
    pub fn register_rank_field(&mut self, field: &str, weight: u32) {
        self.rank.push(RankField {
            field: field.to_string(),
            weight,
        });
    }

    /// Adds `field` at position `order` of sort key `key`.
    pub fn register_sort(
        &mut self,
        key: &str,
        field: &str,
        direction: SortDirection,
        order: u32,
    ) -> Result<(), CatalogError> {
        let fields = self.sorts.entry(key.to_string()).or_default();
        if let Some(existing) = fields.iter().find(|f| f.order == order) {
            return Err(CatalogError::SortClash {
                key: key.to_string(),
                field: field.to_string(),
                existing: existing.field.clone(),
                order,
            });
        }
        fields.push(SortField {
            field: field.to_string(),
            direction,
            order,
        });
        Ok(())
    }

    /// Freezes the registrations into a read-only catalog.
    ///
    /// Free-text targets and rank fields are ordered by descending weight, keeping
    /// registration order among equals; sort fields by ascending order.
    pub fn build(self) -> Catalog {
        let mut full_text = self.full_text;
        full_text.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        let mut rank = self.rank;
        rank.sort_by(|a, b| b.weight.cmp(&a.weight));
        let mut sorts = self.sorts;
        for fields in sorts.values_mut() {
            fields.sort_by_key(|f| f.order);
        }
        debug!(
            entity = %self.entity,
            facets = self.facets.len(),
            filters = self.filter_list.len(),
            dynamic = self.dynamic.len(),
            "catalog built"
        );

        Catalog {
            entity: self.entity,
            filters: self.filters,
            filter_list: self.filter_list,
            facets: self.facets,
            facets_by_category: self.facets_by_category,
            facets_by_field: self.facets_by_field,
            facets_by_type: self.facets_by_type,
            dynamic: self.dynamic,
            fields: self.fields,
            aliases: self.aliases,
            full_text,
            rank,
            sorts,
            weighted: SnapshotMemo::default(),
            highlight: SnapshotMemo::default(),
        }
    }
}
