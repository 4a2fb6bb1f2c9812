//! Facets assigned to one request and their rendering into facet parameters.

use std::collections::{HashMap, HashSet};

use quarry_catalog::{Hint, ValueRange};

use crate::BackendRequest;

/// A facet requested for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedFacet {
    /// Backend field to count.
    pub field: String,
    /// Tag matched against applied filters for exclusion.
    pub tag: String,
    /// Cardinality hint.
    pub hint: Hint,
    /// Maximum number of counted values, unlimited if `None`.
    pub limit: Option<usize>,
}

/// Assigned facets, unique by field; the first assignment of a field wins.
#[derive(Debug, Clone, Default)]
pub struct AssignedFacets {
    /// Facets in assignment order.
    facets: Vec<AssignedFacet>,
}

impl AssignedFacets {
    /// Adds `facet` unless its field is already assigned. Returns true if added.
    pub fn insert(&mut self, facet: AssignedFacet) -> bool {
        if self.facets.iter().any(|f| f.field == facet.field) {
            return false;
        }
        self.facets.push(facet);
        true
    }

    /// Assigned facets in order.
    pub fn iter(&self) -> impl Iterator<Item = &AssignedFacet> {
        self.facets.iter()
    }

    /// Number of assigned facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Returns true if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// The counting strategy used for most facets, or `None` if there are none.
    ///
    /// The first strategy seen is the default until another one occurs more than once
    /// and more often than any before it.
    pub fn default_range(&self) -> Option<ValueRange> {
        let mut occurrences: HashMap<ValueRange, usize> = HashMap::new();
        let mut best = None;
        let mut max_count = 1;
        for facet in &self.facets {
            let range = facet.hint.value_range();
            let count = occurrences.entry(range).or_default();
            *count += 1;
            if *count == 1 {
                if best.is_none() {
                    best = Some(range);
                }
            } else if *count > max_count {
                max_count = *count;
                best = Some(range);
            }
        }
        best
    }

    /// Writes the facet parameters, excluding every facet's own filter if it was applied.
    pub fn apply_to(&self, request: &mut BackendRequest, filtered_tags: &HashSet<String>) {
        let Some(default) = self.default_range() else {
            return;
        };
        request.set("facet", true);
        request.set("facet.mincount", 1);
        request.set("facet.method", default.method());

        for facet in &self.facets {
            if filtered_tags.contains(&facet.tag) {
                request.add("facet.field", format!("{{!ex={}}}{}", facet.tag, facet.field));
            } else {
                request.add("facet.field", &facet.field);
            }
            let range = facet.hint.value_range();
            if range != default {
                request.set(&format!("f.{}.facet.method", facet.field), range.method());
            }
            if facet.hint == Hint::OnlyCount {
                request.set(&format!("f.{}.facet.exists", facet.field), true);
            }
            if let Some(limit) = facet.limit
                && limit > 0
            {
                request.set(&format!("f.{}.facet.limit", facet.field), limit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facet(field: &str, hint: Hint) -> AssignedFacet {
        AssignedFacet {
            field: field.into(),
            tag: field.trim_end_matches("_s").into(),
            hint,
            limit: None,
        }
    }

    fn facets(list: &[(&str, Hint)]) -> AssignedFacets {
        let mut out = AssignedFacets::default();
        for (field, hint) in list {
            out.insert(facet(field, *hint));
        }
        out
    }

    #[test]
    fn unique_by_field() {
        let mut f = AssignedFacets::default();
        assert!(f.insert(facet("color_s", Hint::Small)));
        assert!(!f.insert(facet("color_s", Hint::Large)));
        assert_eq!(f.len(), 1);
        assert_eq!(f.iter().next().unwrap().hint, Hint::Small);
    }

    #[test]
    fn default_range_majority() {
        let f = facets(&[
            ("a_s", Hint::Small),
            ("b_s", Hint::Large),
            ("c_s", Hint::Large),
        ]);
        assert_eq!(f.default_range(), Some(ValueRange::Large));
    }

    #[test]
    fn default_range_first_seen_on_tie() {
        let f = facets(&[("a_s", Hint::Large), ("b_s", Hint::Small)]);
        assert_eq!(f.default_range(), Some(ValueRange::Large));
        assert_eq!(AssignedFacets::default().default_range(), None);
    }

    #[test]
    fn default_range_needs_strict_lead() {
        // Two of each: the later strategy must beat the earlier count, not just tie it.
        let f = facets(&[
            ("a_s", Hint::Small),
            ("b_s", Hint::Small),
            ("c_s", Hint::Large),
            ("d_s", Hint::Large),
        ]);
        assert_eq!(f.default_range(), Some(ValueRange::Limited));
    }

    #[test]
    fn exclusion_only_for_filtered_tags() {
        let f = facets(&[("color_s", Hint::Small), ("size_s", Hint::Small)]);
        let filtered: HashSet<String> = ["color".to_string()].into();
        let mut req = BackendRequest::default();
        f.apply_to(&mut req, &filtered);
        assert_eq!(req.facet_fields(), ["{!ex=color}color_s", "size_s"]);
        assert_eq!(req.get("facet"), Some("true"));
        assert_eq!(req.get("facet.method"), Some("enum"));
    }

    #[test]
    fn per_field_overrides() {
        let mut f = facets(&[
            ("a_s", Hint::Small),
            ("b_s", Hint::Small),
            ("c_s", Hint::Large),
            ("d_s", Hint::OnlyCount),
        ]);
        f.insert(AssignedFacet {
            field: "e_s".into(),
            tag: "e".into(),
            hint: Hint::Small,
            limit: Some(5),
        });
        let mut req = BackendRequest::default();
        f.apply_to(&mut req, &HashSet::new());
        assert_eq!(req.get("f.c_s.facet.method"), Some("fc"));
        assert_eq!(req.get("f.a_s.facet.method"), None);
        assert_eq!(req.get("f.d_s.facet.exists"), Some("true"));
        assert_eq!(req.get("f.d_s.facet.method"), None);
        assert_eq!(req.get("f.e_s.facet.limit"), Some("5"));
    }

    #[test]
    fn nothing_assigned_writes_nothing() {
        let mut req = BackendRequest::default();
        AssignedFacets::default().apply_to(&mut req, &HashSet::new());
        assert!(req.is_empty());
    }
}
