//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bnchmrk: sanity checks for the benchmarking export
#[derive(Parser)]
#[command(name = "bnchmrk")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormatChoice,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the fact, NAICS and county exports and write the report
    Check {
        /// Fact table CSV
        #[arg(long, value_name = "PATH")]
        fact: PathBuf,

        /// NAICS reference CSV
        #[arg(long, value_name = "PATH")]
        naics: PathBuf,

        /// County reference CSV
        #[arg(long, value_name = "PATH")]
        county: PathBuf,

        /// Directory for the Markdown and JSON reports (created if missing)
        #[arg(long, value_name = "DIR")]
        outdir: PathBuf,

        /// JSON configuration file (column map, baselines, thresholds)
        #[arg(short, long, value_name = "JSON")]
        config: Option<PathBuf>,

        /// Rows per year in each outlier sample
        #[arg(long)]
        top_n: Option<usize>,

        /// Field delimiter: a single character, "tab", or "auto"
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Print the JSON summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Print or write the default configuration
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatChoice {
    Pretty,
    Compact,
    Json,
}
