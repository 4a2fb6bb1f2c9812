//! Sort expressions.

use quarry_catalog::{RankField, SortField};

/// Query text matching every document.
pub const MATCH_ALL: &str = "*:*";

/// Returns true if `q` is a real free-text query rather than empty or match-all.
pub fn is_free_text(q: &str) -> bool {
    !q.is_empty() && q != MATCH_ALL
}

/// Strips everything but word characters, whitespace, `.-+?` and German umlauts, so the
/// text can be embedded in a quoted local parameter.
pub fn plain_query(q: &str) -> String {
    q.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '_' | '.' | '-' | '+' | '?' | 'ü' | 'ä' | 'ö' | 'Ö' | 'Ä' | 'Ü')
        })
        .collect()
}

/// Builds a function scoring `q` against every rank field, highest weight first.
///
/// Each field contributes `query({!edismax v='<q>' qf=<field>},0.0001)`, wrapped in
/// `product(..., <weight>)` when the weight is above 1; the contributions are summed.
pub fn scoring_function(q: &str, rank: &[RankField]) -> String {
    let plain = plain_query(q);
    let clauses: Vec<String> = rank
        .iter()
        .map(|r| {
            let clause = format!("query({{!edismax v='{plain}' qf={}}},0.0001)", r.field);
            if r.weight > 1 {
                format!("product({clause},{})", r.weight)
            } else {
                clause
            }
        })
        .collect();
    format!("sum({})", clauses.join(","))
}

/// Renders an ordered field sort: `created_dt desc,id_l asc`.
pub fn field_sort(fields: &[SortField]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.direction))
        .collect::<Vec<_>>()
        .join(",")
}
