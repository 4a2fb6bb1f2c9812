//! Frozen catalogs for every entity declared in a catalog file.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use crate::{
    Catalog, CatalogBuilder, CatalogError, FacetDescriptor, FullTextTarget, ValueType,
    parse::{RawCatalogFile, RawEntity, RawTextTarget, param_text, parse_catalog_file},
};

/// Read-only map of entity name to catalog.
#[derive(Debug, Default, Clone)]
pub struct CatalogSet {
    /// Catalogs by entity name.
    catalogs: BTreeMap<String, Arc<Catalog>>,
}

impl CatalogSet {
    /// Loads and freezes every entity of the catalog file at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Self::from_raw(parse_catalog_file(path)?)
    }

    /// Applies every declaration of a parsed file through a [`CatalogBuilder`].
    pub fn from_raw(raw: RawCatalogFile) -> Result<Self, CatalogError> {
        let mut catalogs = BTreeMap::new();
        for (name, entity) in raw.entity {
            let catalog = build_entity(&name, entity)?;
            catalogs.insert(name, Arc::new(catalog));
        }
        Ok(Self { catalogs })
    }

    /// Adds a catalog built in code, replacing any catalog of the same entity.
    pub fn insert(&mut self, catalog: Catalog) {
        self.catalogs
            .insert(catalog.entity().to_string(), Arc::new(catalog));
    }

    /// The catalog of `entity`.
    pub fn get(&self, entity: &str) -> Result<&Arc<Catalog>, CatalogError> {
        self.catalogs
            .get(entity)
            .ok_or_else(|| CatalogError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    /// Every catalog, by entity name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Catalog>)> {
        self.catalogs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// Returns true if no entity is declared.
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

/// Tag for a field declared without one: the field name minus its `_suffix`.
fn default_tag(field: &str) -> &str {
    field.rsplit_once('_').map_or(field, |(stem, _)| stem)
}

/// Builds one entity's catalog from its raw declarations.
fn build_entity(name: &str, raw: RawEntity) -> Result<Catalog, CatalogError> {
    let mut builder = CatalogBuilder::new(name);

    for (field, params) in &raw.fields {
        builder.register_field(field, Vec::<String>::new());
        for (param, value) in params {
            builder.field_parameter(field, param, param_text(value))?;
        }
    }
    for (alias, field) in raw.aliases {
        builder.register_field(&field, [alias]);
    }

    for ft in raw.full_text {
        let target = match ft.target {
            RawTextTarget::Field(field) => FullTextTarget::field(field),
            RawTextTarget::Pattern(glob) => FullTextTarget::pattern(&glob)?,
        };
        builder.register_full_text(target, ft.weight.unwrap_or(1.0));
    }

    for filter in raw.filter {
        let tag = filter
            .tag
            .unwrap_or_else(|| default_tag(&filter.field).to_string());
        builder.register_filter(&filter.field, &tag, filter.value.into(), filter.categories)?;
    }

    for facet in raw.facet {
        let tag = facet
            .tag
            .unwrap_or_else(|| default_tag(&facet.field).to_string());
        let value_type = ValueType::from(facet.value);
        if value_type == ValueType::Text {
            builder.register_string_facet(&facet.field, &tag, facet.hint, facet.categories)?;
        } else {
            builder.register_facet(FacetDescriptor::new(
                facet.field,
                tag,
                value_type,
                facet.hint,
                facet.categories,
            ))?;
        }
    }

    for dynamic in raw.dynamic_facet {
        builder.register_dynamic_facet(
            dynamic.value.into(),
            &dynamic.field,
            dynamic.filter_field.as_deref(),
            dynamic.hint,
            &dynamic.categories,
        )?;
    }

    for rank in raw.rank {
        builder.register_rank_field(&rank.field, rank.weight.unwrap_or(1));
    }

    for sort in raw.sort {
        builder.register_sort(&sort.key, &sort.field, sort.direction, sort.order.unwrap_or(1))?;
    }

    Ok(builder.build())
}
