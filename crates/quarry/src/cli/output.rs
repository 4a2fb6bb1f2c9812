//! Rendering and JSON serialization for CLI output.

use std::{process::ExitCode, sync::Arc};

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use quarry_catalog::Catalog;
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Creates a table with the CLI's preset and `header`.
fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header);
    table
}

/// Prints a section heading and `table`, or `(none)` when it has no rows.
fn print_section(title: &str, table: &Table) {
    println!("{title}:");
    if table.row_count() == 0 {
        println!("  (none)");
    } else {
        println!("{table}");
    }
    println!();
}

/// Prints everything one catalog declares.
///
/// Glob full-text targets are expanded against `live_fields`.
pub fn print_catalog(catalog: &Catalog, live_fields: &Arc<[String]>) {
    println!("Entity: {}", catalog.entity());
    println!();

    let mut facets = table(vec!["Field", "Tag", "Type", "Hint", "Categories"]);
    for facet in catalog.all_facets() {
        facets.add_row(vec![
            Cell::new(facet.field()),
            Cell::new(facet.tag()),
            Cell::new(facet.value_type().to_string()),
            Cell::new(facet.hint().to_string()),
            Cell::new(facet.categories().join(", ")),
        ]);
    }
    print_section("Facets", &facets);

    let mut filters = table(vec!["Field", "Tag", "Type", "Categories"]);
    for filter in catalog.filters() {
        filters.add_row(vec![
            Cell::new(filter.field()),
            Cell::new(filter.tag()),
            Cell::new(filter.value_type().to_string()),
            Cell::new(filter.categories().join(", ")),
        ]);
    }
    print_section("Filters", &filters);

    let mut dynamic = table(vec!["Field", "Filter field", "Group", "Type", "Hint"]);
    for facet in catalog.dynamic_facets() {
        dynamic.add_row(vec![
            Cell::new(facet.field_pattern().to_string()),
            Cell::new(facet.filter_pattern().to_string()),
            Cell::new(facet.group()),
            Cell::new(facet.value_type().to_string()),
            Cell::new(facet.hint().to_string()),
        ]);
    }
    print_section("Dynamic facets", &dynamic);

    let mut sorts = table(vec!["Key", "Fields"]);
    for key in catalog.sort_keys() {
        let fields = catalog
            .sort(key)
            .unwrap_or_default()
            .iter()
            .map(|f| format!("{} {}", f.field, f.direction))
            .collect::<Vec<_>>()
            .join(", ");
        sorts.add_row(vec![Cell::new(key), Cell::new(fields)]);
    }
    print_section("Sort keys", &sorts);

    let weighted = catalog.weighted_fields(live_fields);
    if !weighted.is_empty() {
        println!("Full-text fields: {weighted}");
        println!("Highlight fields: {}", catalog.highlight_fields(live_fields));
    }
    let rank = catalog
        .rank_fields()
        .iter()
        .map(|r| format!("{}^{}", r.field, r.weight))
        .collect::<Vec<_>>();
    if !rank.is_empty() {
        println!("Rank fields: {}", rank.join(" "));
    }
}
