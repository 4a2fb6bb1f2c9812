//! `quarry check`: load a catalog file and show what it declares.

use std::process::ExitCode;

use crate::cli::{
    args::CheckCommand,
    context::{CommandContext, load_field_directory},
    output::print_catalog,
};

/// Implements the `quarry check` command.
pub fn run(cmd: &CheckCommand) -> ExitCode {
    let ctx = match CommandContext::load(&cmd.catalog.catalog) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let directory = match load_field_directory(cmd.fields.as_deref()) {
        Ok(directory) => directory,
        Err(code) => return code,
    };
    let live_fields = directory.snapshot();

    if ctx.catalogs.is_empty() {
        println!("No entities declared in {}.", cmd.catalog.catalog.display());
        return ExitCode::SUCCESS;
    }

    for (index, (_, catalog)) in ctx.catalogs.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print_catalog(catalog, &live_fields);
    }
    ExitCode::SUCCESS
}
