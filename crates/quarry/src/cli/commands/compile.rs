//! `quarry compile`: turn a search into engine request parameters.

use std::{process::ExitCode, sync::Arc};

use quarry_catalog::Catalog;
use quarry_filter::Value;
use quarry_query::{BackendRequest, DEFAULT_MINIMUM_MATCH, QueryBuilder, QueryError};
use serde::Serialize;

use crate::cli::{
    args::CompileCommand,
    context::{CommandContext, load_field_directory},
    output::print_json,
};

/// Filter value admitting documents without the field.
const NULL_VALUE: &str = "null";

/// JSON output for `quarry compile`.
#[derive(Serialize)]
struct JsonRequest<'a> {
    /// Request handler path.
    handler: &'a str,
    /// Parameters in insertion order.
    params: &'a BackendRequest,
}

/// Implements the `quarry compile` command.
pub fn run(cmd: &CompileCommand) -> ExitCode {
    let ctx = match CommandContext::load(&cmd.catalog.catalog) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let catalog = match ctx.catalog(&cmd.entity) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };
    let directory = match load_field_directory(cmd.fields.as_deref()) {
        Ok(directory) => directory,
        Err(code) => return code,
    };

    let request = match compile(catalog, directory.snapshot(), cmd) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(&JsonRequest {
            handler: request.handler(),
            params: &request,
        });
    }
    print!("{request}");
    ExitCode::SUCCESS
}

/// Parses one command-line filter value.
fn filter_value(raw: &str) -> Value {
    if raw == NULL_VALUE {
        Value::Null
    } else {
        Value::from(raw)
    }
}

/// Feeds the command's options through a [`QueryBuilder`].
fn compile(
    catalog: &Catalog,
    live_fields: Arc<[String]>,
    cmd: &CompileCommand,
) -> Result<BackendRequest, QueryError> {
    let mut builder = QueryBuilder::new(catalog, live_fields);
    builder.set_highlighting(!cmd.no_highlight);
    if let Some(rows) = cmd.rows {
        builder.set_rows(rows);
    }
    if let Some(start) = cmd.start {
        builder.set_start(start);
    }
    if let Some(query) = &cmd.query {
        let mm = cmd.mm.as_deref().unwrap_or(DEFAULT_MINIMUM_MATCH);
        builder.set_query_with_mm(query, Some(mm))?;
    }

    for filter in &cmd.filters {
        let values = filter.values.iter().map(String::as_str).map(filter_value);
        builder.apply_filter(&filter.category, values)?;
    }
    for raw in &cmd.raw_filters {
        builder.add_user_defined_filter(raw)?;
    }

    if cmd.all_facets {
        builder.add_all_facets();
    }
    for facet in &cmd.facets {
        builder.add_facet(&facet.category, facet.limit)?;
    }
    for dynamic in &cmd.dynamic_facets {
        builder.add_dynamic_facet(&dynamic.group, &dynamic.key, None)?;
    }

    if let Some(sort) = &cmd.sort {
        builder.set_sorting(sort)?;
    }
    Ok(builder.build())
}
