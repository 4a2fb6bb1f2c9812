//! `quarry decode`: decode an engine response into a typed result.

use std::{fs, process::ExitCode};

use quarry_query::BackendRequest;
use quarry_result::{EngineResponse, JsonDocumentMapper, ResultDecoder};

use crate::cli::{args::DecodeCommand, context::CommandContext, output::print_json};

/// Implements the `quarry decode` command.
pub fn run(cmd: &DecodeCommand) -> ExitCode {
    let ctx = match CommandContext::load(&cmd.catalog.catalog) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let catalog = match ctx.catalog(&cmd.entity) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };

    let text = match fs::read_to_string(&cmd.response) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", cmd.response.display());
            return ExitCode::FAILURE;
        }
    };
    let response = match EngineResponse::from_solr_json(&text) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("error: invalid response {}: {e}", cmd.response.display());
            return ExitCode::FAILURE;
        }
    };

    let mut request = BackendRequest::default();
    if let Some(rows) = cmd.rows {
        request.set("rows", rows);
    }

    let decoder = ResultDecoder::new(catalog, JsonDocumentMapper::new(cmd.id_field.as_str()));
    match decoder.decode(&request, response) {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
