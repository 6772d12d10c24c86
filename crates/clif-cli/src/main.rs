//! `clif` command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use clif_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command};
use crate::commands::{run_stitch_command, run_waterfall_command};
use crate::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: cannot open log output: {error}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Waterfall(args) => run_waterfall_command(args),
        Command::Stitch(args) => run_stitch_command(args),
    };
    match result {
        Ok(run) => {
            print_summary(&run);
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
