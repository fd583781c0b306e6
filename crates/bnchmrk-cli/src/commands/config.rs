//! Config command - print or write the default configuration.

use std::fs;
use std::path::PathBuf;

use bnchmrk::SanityConfig;
use colored::Colorize;

pub fn run(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&SanityConfig::default())?;

    match output {
        Some(path) => {
            fs::write(&path, format!("{}\n", json))
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            println!(
                "{} {}",
                "Wrote default config to".green().bold(),
                path.display().to_string().white()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
