//! The per-request query compiler.

use std::{collections::HashSet, sync::Arc, time::Instant};

use quarry_catalog::{
    Catalog, DEFAULT_SNIPPETS, DynamicFacetDescriptor, FacetDescriptor, FilterDescriptor, Hint,
    RELEVANCE, ValueType, encode_key,
};
use quarry_filter::{Filter, Value};
use tracing::{debug, info, warn};

use crate::{
    AssignedFacet, AssignedFacets, BackendRequest, QueryError,
    sort::{MATCH_ALL, field_sort, is_free_text, scoring_function},
    text::{extract_tags, fields_with_weight, has_boolean_operator, is_quoted, replace_aliases},
};

/// Phrase slop used unless [`QueryBuilder::set_slop`] overrides it.
pub const DEFAULT_SLOP: u32 = 10;

/// Highlight fragment size in characters.
pub const DEFAULT_FRAGMENT_SIZE: usize = 120;

/// Minimum-match used by [`QueryBuilder::set_query`].
pub const DEFAULT_MINIMUM_MATCH: &str = "1";

/// Minimum-match value that suppresses the parameter.
pub const MINIMUM_MATCH_OFF: &str = "off";

/// Spellcheck collation tries, always sent to override a broken server default.
pub const MAX_COLLATION_TRIES: u32 = 10;

/// Weight given to phrase-boosted fields.
pub const PHRASE_WEIGHT: u32 = 50;

/// Weighted fields searched by free text.
pub const QUERY_FIELDS: &str = "text_unstemmed^100 text_en tags^20";

/// Field matched by `#tag` tokens in free text.
pub const TAGS_FIELD: &str = "tags";

/// Parser for text containing a quoted phrase.
const PHRASE_PARSER: &str = "edismax";

/// Parser for everything else.
const SYNONYM_PARSER: &str = "synonym_edismax";

/// Page size the engine assumes when `rows` is unset.
pub const DEFAULT_ROWS: usize = 10;

/// Accumulates one search request against a frozen [`Catalog`].
///
/// Every mutator is only available while the builder is alive; [`build`](Self::build)
/// consumes it and returns the finished [`BackendRequest`].
///
/// ```
/// use quarry_catalog::{CatalogBuilder, Hint};
/// use quarry_query::QueryBuilder;
///
/// let mut catalog = CatalogBuilder::new("product");
/// catalog
///     .register_string_facet("color_s", "color", Hint::Small, ["color"])
///     .unwrap();
/// let catalog = catalog.build();
///
/// let mut query = QueryBuilder::new(&catalog, Vec::<String>::new().into());
/// query.apply_filter("color", ["red"]).unwrap();
/// query.add_facet("color", None).unwrap();
/// let request = query.build();
/// assert_eq!(request.filter_queries(), ["{!tag=color}color_s:red"]);
/// assert_eq!(request.facet_fields(), ["{!ex=color}color_s"]);
/// ```
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    /// Catalog resolving categories, groups, aliases and sort keys.
    catalog: &'a Catalog,
    /// Live field names, for dynamic facets and full-text globs.
    live_fields: Arc<[String]>,
    /// Parameters written so far.
    request: BackendRequest,
    /// Tags of every applied filter.
    filtered_tags: HashSet<String>,
    /// Facets to count.
    facets: AssignedFacets,
    /// Whether matches should be highlighted.
    highlight: bool,
    /// Active sort key.
    sorting: String,
    /// Whether a free-text query was set.
    query_set: bool,
    /// When the builder was created.
    started: Instant,
}

impl<'a> QueryBuilder<'a> {
    /// Starts a request with the catalog's field parameters and the default settings.
    pub fn new(catalog: &'a Catalog, live_fields: Arc<[String]>) -> Self {
        let mut request = BackendRequest::default();
        for (field, params) in catalog.fields() {
            for (param, value) in params {
                request.add(&format!("f.{field}.{param}"), value);
            }
        }
        request.set("fl", "*");
        request.set("facet.mincount", 1);
        request.set("q", MATCH_ALL);
        request.set("ps", DEFAULT_SLOP);
        Self {
            catalog,
            live_fields,
            request,
            filtered_tags: HashSet::new(),
            facets: AssignedFacets::default(),
            highlight: true,
            sorting: RELEVANCE.to_string(),
            query_set: false,
            started: Instant::now(),
        }
    }

    /// The catalog this request resolves against.
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Parameters written so far.
    pub fn request(&self) -> &BackendRequest {
        &self.request
    }

    /// Tags of every filter applied so far.
    pub fn filtered_tags(&self) -> &HashSet<String> {
        &self.filtered_tags
    }

    /// Facets assigned so far.
    pub fn assigned_facets(&self) -> &AssignedFacets {
        &self.facets
    }

    /// Sets the page size.
    pub fn set_rows(&mut self, rows: usize) -> &mut Self {
        self.request.set("rows", rows);
        self
    }

    /// Sets the page offset.
    pub fn set_start(&mut self, start: usize) -> &mut Self {
        self.request.set("start", start);
        self
    }

    /// Enables or disables highlighting. Enabled by default.
    pub fn set_highlighting(&mut self, highlight: bool) -> &mut Self {
        self.highlight = highlight;
        self
    }

    /// Sets the phrase slop.
    pub fn set_slop(&mut self, slop: u32) -> &mut Self {
        self.request.set("ps", slop);
        self
    }

    /// Sets free text with the default minimum-match.
    pub fn set_query(&mut self, text: &str) -> Result<&mut Self, QueryError> {
        self.set_query_with_mm(text, Some(DEFAULT_MINIMUM_MATCH))
    }

    /// Sets free text.
    ///
    /// `#tag` tokens become `tags:<tag>` filters. If only tags were given the query stays
    /// match-all. `minimum_match` is skipped when it is `None`, `off`, or the text holds an
    /// explicit `AND`/`OR`.
    pub fn set_query_with_mm(
        &mut self,
        text: &str,
        minimum_match: Option<&str>,
    ) -> Result<&mut Self, QueryError> {
        let (text, tags) = extract_tags(text);
        for tag in tags {
            self.apply(&Filter::untagged(TAGS_FIELD, [tag])?);
        }
        if text.is_empty() {
            return Ok(self);
        }

        if let Some(mm) = minimum_match
            && !mm.eq_ignore_ascii_case(MINIMUM_MATCH_OFF)
        {
            if has_boolean_operator(&text) {
                debug!(mm, %text, "boolean query, minimum match not set");
            } else {
                self.request.set("mm", mm);
            }
        }

        let parser = if is_quoted(&text) {
            PHRASE_PARSER
        } else {
            SYNONYM_PARSER
        };
        self.request.set("defType", parser);
        self.request.set("q", &text);
        self.request.set("qf", QUERY_FIELDS);
        self.request
            .set("pf", fields_with_weight(QUERY_FIELDS, PHRASE_WEIGHT));
        self.request
            .set("spellcheck.maxCollationTries", MAX_COLLATION_TRIES);
        self.query_set = true;
        Ok(self)
    }

    /// Builds a filter over the category's field, values OR-ed. Not applied yet.
    pub fn filter<V>(
        &self,
        category: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Filter, QueryError>
    where
        V: Into<Value>,
    {
        let descriptor = self.filter_descriptor(category)?;
        Ok(Filter::direct(descriptor.field(), descriptor.tag(), values)?)
    }

    /// Builds and applies a filter over the category's field.
    pub fn apply_filter<V>(
        &mut self,
        category: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<&mut Self, QueryError>
    where
        V: Into<Value>,
    {
        let filter = self.filter(category, values)?;
        Ok(self.apply(&filter))
    }

    /// Builds a filter over one key of a dynamic facet family. Not applied yet.
    ///
    /// The key is encoded before it is spliced into the filter field; the tag is
    /// `<group>_<encoded key>`, matching the facet of the same key.
    pub fn dynamic_filter<V>(
        &self,
        group: &str,
        key: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Filter, QueryError>
    where
        V: Into<Value>,
    {
        let descriptor = self
            .catalog
            .dynamic_by_group(group)
            .ok_or_else(|| QueryError::UnknownGroup(group.to_string()))?;
        let encoded = encode_key(key);
        let tag = descriptor.tag_for(&encoded);
        debug!(%tag, "dynamic filter");
        Ok(Filter::direct(
            descriptor.filter_field_for(&encoded),
            tag,
            values,
        )?)
    }

    /// Builds a tagged filter on a backend field, bypassing the catalog. Not applied yet.
    pub fn direct_filter<V>(
        &self,
        field: &str,
        tag: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Filter, QueryError>
    where
        V: Into<Value>,
    {
        Ok(Filter::direct(field, tag, values)?)
    }

    /// Adds `filter` as a filter query and records its tag.
    pub fn apply(&mut self, filter: &Filter) -> &mut Self {
        if let Some(tag) = filter.tag() {
            self.filtered_tags.insert(tag.to_string());
        }
        self.request.add("fq", filter.apply());
        self
    }

    /// Adds a literal filter query.
    pub fn apply_raw(&mut self, text: &str) -> &mut Self {
        self.request.add("fq", text);
        self
    }

    /// Adds a literal filter query after replacing every `$alias` with its field.
    pub fn add_user_defined_filter(&mut self, text: &str) -> Result<&mut Self, QueryError> {
        let catalog = self.catalog;
        let resolved = replace_aliases(text, |alias| catalog.field_for_alias(alias))
            .map_err(QueryError::UnknownAlias)?;
        Ok(self.apply_raw(&resolved))
    }

    /// Counts the facet of `category`.
    ///
    /// A dynamic family is expanded to one facet per live field matching its pattern.
    pub fn add_facet(
        &mut self,
        category: &str,
        limit: Option<usize>,
    ) -> Result<&mut Self, QueryError> {
        if let Some(facet) = self.catalog.facet_by_category(category) {
            self.assign(facet, limit);
            return Ok(self);
        }
        let dynamic = self
            .catalog
            .dynamic_by_category(category)
            .ok_or_else(|| QueryError::UnknownFacet(category.to_string()))?;
        self.assign_dynamic(dynamic, limit);
        Ok(self)
    }

    /// Counts every static facet decoding into `value_type`.
    pub fn add_facets_by_type(
        &mut self,
        value_type: &ValueType,
        limit: Option<usize>,
    ) -> Result<&mut Self, QueryError> {
        let facets = self
            .catalog
            .facets_by_type(value_type)
            .ok_or_else(|| QueryError::UnknownValueType(value_type.clone()))?;
        for facet in facets {
            self.assign(facet, limit);
        }
        Ok(self)
    }

    /// Counts every static facet. Dynamic families are skipped.
    pub fn add_all_facets(&mut self) -> &mut Self {
        for facet in self.catalog.all_facets() {
            self.assign(facet, None);
        }
        self
    }

    /// Counts one key of a dynamic family, whether or not the field exists yet.
    pub fn add_dynamic_facet(
        &mut self,
        group: &str,
        key: &str,
        limit: Option<usize>,
    ) -> Result<&mut Self, QueryError> {
        let descriptor = self
            .catalog
            .dynamic_by_category(group)
            .or_else(|| self.catalog.dynamic_by_group(group))
            .ok_or_else(|| QueryError::UnknownFacet(group.to_string()))?;
        let encoded = encode_key(key);
        let facet = AssignedFacet {
            field: descriptor.field_for(&encoded),
            tag: descriptor.tag_for(&encoded),
            hint: descriptor.hint(),
            limit,
        };
        Ok(self.add_assigned(facet))
    }

    /// Counts a backend field directly, bypassing the catalog.
    pub fn add_direct_facet(
        &mut self,
        field: &str,
        tag: &str,
        hint: Hint,
        limit: Option<usize>,
    ) -> &mut Self {
        self.add_assigned(AssignedFacet {
            field: field.to_string(),
            tag: tag.to_string(),
            hint,
            limit,
        })
    }

    /// Selects a registered sort key.
    pub fn set_sorting(&mut self, key: &str) -> Result<&mut Self, QueryError> {
        if self.catalog.sort(key).is_none() {
            return Err(QueryError::UnknownSort(key.to_string()));
        }
        key.clone_into(&mut self.sorting);
        Ok(self)
    }

    /// Finishes the request: highlighting, facet parameters and sort.
    pub fn build(mut self) -> BackendRequest {
        if self.highlight && self.query_set {
            self.apply_highlighting();
        }
        self.facets.apply_to(&mut self.request, &self.filtered_tags);
        self.apply_sorting();
        debug!(
            entity = self.catalog.entity(),
            facets = self.facets.len(),
            filters = self.request.filter_queries().len(),
            elapsed = ?self.started.elapsed(),
            "query built"
        );
        self.request
    }

    /// Looks up the filter registered for `category`.
    fn filter_descriptor(&self, category: &str) -> Result<&'a FilterDescriptor, QueryError> {
        self.catalog
            .filter(category)
            .map(|d| &**d)
            .ok_or_else(|| QueryError::UnknownFilter(category.to_string()))
    }

    /// Assigns a static facet.
    fn assign(&mut self, facet: &FacetDescriptor, limit: Option<usize>) {
        debug!(tag = facet.tag(), field = facet.field(), "adding facet");
        self.add_assigned(AssignedFacet {
            field: facet.field().to_string(),
            tag: facet.tag().to_string(),
            hint: facet.hint(),
            limit,
        });
    }

    /// Assigns one facet per live field matching a dynamic family.
    fn assign_dynamic(&mut self, descriptor: &DynamicFacetDescriptor, limit: Option<usize>) {
        let candidates = descriptor.resolve_candidates(&self.live_fields);
        debug!(
            group = descriptor.group(),
            live = self.live_fields.len(),
            matched = candidates.len(),
            "resolved dynamic facets"
        );
        for candidate in candidates {
            self.add_assigned(AssignedFacet {
                tag: descriptor.tag_for(&candidate.key),
                field: candidate.field,
                hint: descriptor.hint(),
                limit,
            });
        }
    }

    /// Adds a facet; a field already assigned keeps its first assignment.
    fn add_assigned(&mut self, facet: AssignedFacet) -> &mut Self {
        if !self.facets.insert(facet) {
            debug!("facet field already assigned");
        }
        self
    }

    /// Writes the highlighting parameters.
    fn apply_highlighting(&mut self) {
        let fields = self.catalog.highlight_fields(&self.live_fields);
        self.request.set("hl", true);
        if !fields.is_empty() {
            self.request.set("hl.fl", fields);
        }
        self.request.set("hl.requireFieldMatch", false);
        self.request.set("hl.preserveMulti", true);
        self.request.set("hl.usePhraseHighlighter", true);
        self.request.set("hl.highlightMultiTerm", true);
        self.request.set("hl.snippets", DEFAULT_SNIPPETS);
        self.request.set("hl.fragsize", DEFAULT_FRAGMENT_SIZE);
    }

    /// Writes the sort: a relevance-rank scoring function for paged free-text searches
    /// sorted by relevance, otherwise the fields of the active sort key.
    fn apply_sorting(&mut self) {
        let rows = self.request.rows().unwrap_or(DEFAULT_ROWS);
        let rank = self.catalog.rank_fields();
        if rows > 0 && self.sorting == RELEVANCE && !rank.is_empty() {
            let q = self.request.get("q").unwrap_or_default();
            if is_free_text(q) {
                let function = scoring_function(q, rank);
                info!(sort = %function, "sorting by relevance rank");
                self.request.set("sort", format!("{function} desc"));
                return;
            }
        }
        match self.catalog.sort(&self.sorting) {
            Some(fields) if !fields.is_empty() => {
                self.request.set("sort", field_sort(fields));
            }
            _ => warn!(sort = %self.sorting, "no such sort field"),
        }
    }
}
