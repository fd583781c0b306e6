//! bnchmrk CLI - sanity checks for the benchmarking export.
//!
//! Exit codes: 0 when no ERROR check failed, 1 when one did, 2 when an input
//! or the configuration could not be read, 64 on a command-line usage error.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use commands::check::CheckArgs;
use logging::{LogConfig, init_logging};

const EXIT_INPUT_ERROR: i32 = 2;
/// `EX_USAGE` from sysexits.h.
const EXIT_USAGE: i32 = 64;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here and print to stdout
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };
    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet, cli.log_format));

    let result = match cli.command {
        Commands::Check {
            fact,
            naics,
            county,
            outdir,
            config,
            top_n,
            delimiter,
            json,
        } => commands::check::run(CheckArgs {
            fact,
            naics,
            county,
            outdir,
            config,
            top_n,
            delimiter,
            json,
        })
        .map(|status| status.exit_code()),

        Commands::Config { output } => commands::config::run(output).map(|_| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_INPUT_ERROR);
        }
    }
}
