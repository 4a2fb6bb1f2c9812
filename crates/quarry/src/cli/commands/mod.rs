//! Command implementations and dispatch.

pub mod check;
pub mod compile;
pub mod decode;

use std::process::ExitCode;

use super::args::Commands;

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    match command {
        Commands::Check(cmd) => check::run(&cmd),
        Commands::Compile(cmd) => compile::run(&cmd),
        Commands::Decode(cmd) => decode::run(&cmd),
    }
}
