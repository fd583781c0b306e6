//! Check command - run every check and write the report artifacts.

use std::path::PathBuf;

use bnchmrk::{ExportSanity, RunStatus, SanityConfig, SanityInputs, SanityReport, Severity};
use colored::Colorize;

/// Arguments of `bnchmrk check`.
pub struct CheckArgs {
    pub fact: PathBuf,
    pub naics: PathBuf,
    pub county: PathBuf,
    pub outdir: PathBuf,
    pub config: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub delimiter: Option<String>,
    pub json: bool,
}

/// Returns the run status; the caller maps it to the exit code.
pub fn run(args: CheckArgs) -> Result<RunStatus, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SanityConfig::load(path)?,
        None => SanityConfig::default(),
    };
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(delimiter) = &args.delimiter {
        config.delimiter = parse_delimiter(delimiter)?;
    }

    let sanity = ExportSanity::with_config(config)?;
    let inputs = SanityInputs::new(args.fact, args.naics, args.county);

    let report = sanity.run(&inputs)?;
    let artifacts = report.write_artifacts(&args.outdir)?;

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(report.status);
    }

    print_summary(&report);
    println!();
    println!(
        "{} {}",
        "Report:".green().bold(),
        artifacts.markdown.display().to_string().white()
    );
    println!(
        "{} {}",
        "JSON:".green().bold(),
        artifacts.json.display().to_string().white()
    );

    Ok(report.status)
}

/// `auto` selects delimiter detection.
fn parse_delimiter(value: &str) -> Result<Option<char>, String> {
    match value {
        "auto" => Ok(None),
        "tab" | "\\t" => Ok(Some('\t')),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Some(c)),
                _ => Err(format!(
                    "Invalid delimiter '{}': expected a single character, \"tab\" or \"auto\"",
                    value
                )),
            }
        }
    }
}

fn print_summary(report: &SanityReport) {
    for check in &report.checks {
        let status = if check.passed() {
            "PASS".green()
        } else if check.severity == Severity::Error {
            "FAIL".red().bold()
        } else {
            "FAIL".yellow()
        };
        let severity = match check.severity {
            Severity::Error => "ERROR".red(),
            Severity::Warn => "WARN ".yellow(),
        };

        if check.passed() {
            println!("  {} {} {}", severity, status, check.name.dimmed());
        } else {
            println!("  {} {} {}: {}", severity, status, check.name, check.detail);
        }
    }

    let s = &report.summary;
    println!();
    println!(
        "{} checks: ERROR {} passed / {} failed, WARN {} passed / {} failed",
        s.total().to_string().white().bold(),
        s.error_passed.to_string().green(),
        s.error_failed.to_string().red(),
        s.warn_passed.to_string().green(),
        s.warn_failed.to_string().yellow()
    );

    match report.status {
        RunStatus::Success => println!("{} {}", "Status:".bold(), "SUCCESS".green().bold()),
        RunStatus::Failure => println!("{} {}", "Status:".bold(), "FAILURE".red().bold()),
    }
}
