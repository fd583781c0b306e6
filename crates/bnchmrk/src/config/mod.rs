//! Run configuration: column map, baselines and check thresholds.
//!
//! A [`SanityConfig`] is built once per run and handed to every check by
//! reference. Defaults describe the production benchmarking export; a JSON
//! file only needs the fields it wants to change.

mod baselines;
mod columns;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SanityError};

pub use baselines::{Baselines, YearBaseline};
pub use columns::{ColumnMap, ColumnSpec, MetricKind, TableContract, TableKind, roles};

/// Configuration for a sanity-check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    /// Logical role to literal header mapping per table.
    pub columns: ColumnMap,
    /// Expected years and coverage counts.
    pub baselines: Baselines,
    /// Field delimiter (None = auto-detect).
    pub delimiter: Option<char>,
    /// Cell values treated as missing, compared case-insensitively.
    pub null_tokens: Vec<String>,
    /// Rows sampled per metric and year in the outlier tables.
    pub top_n: usize,
    /// Maximum keys listed in a check detail.
    pub sample_limit: usize,
    /// Share of rows (percent) allowed a field count different from the header.
    pub max_ragged_row_pct: f64,
    /// Metrics sampled for outliers.
    pub outlier_metrics: Vec<String>,
    /// Metrics whose null rate is reported per year.
    pub null_rate_metrics: Vec<String>,
    /// Metrics that must be all present or all absent on a row.
    pub abs_metrics: Vec<String>,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            baselines: Baselines::default(),
            delimiter: Some(','),
            null_tokens: ["NA", "N/A", "NULL", "NaN", "None", "#N/A", "<NA>"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            top_n: 10,
            sample_limit: 20,
            max_ragged_row_pct: 0.0,
            outlier_metrics: vec![
                roles::ABS_RECEIPTS.to_string(),
                roles::ABS_PAYROLL.to_string(),
                roles::QCEW_WAGES.to_string(),
            ],
            null_rate_metrics: vec![roles::ABS_FIRMS.to_string(), roles::QCEW_EMP.to_string()],
            abs_metrics: vec![
                roles::ABS_FIRMS.to_string(),
                roles::ABS_EMP.to_string(),
                roles::ABS_PAYROLL.to_string(),
                roles::ABS_RECEIPTS.to_string(),
            ],
        }
    }
}

impl SanityConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SanityError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: SanityConfig = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SanityError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no run could use.
    pub fn validate(&self) -> Result<()> {
        for kind in TableKind::ALL {
            for (role, spec) in &self.columns.contract(kind).columns {
                if spec.headers.is_empty() {
                    return Err(SanityError::Config(format!(
                        "{}: column '{}' lists no header names",
                        kind, role
                    )));
                }
            }
        }
        for role in [roles::FIPS, roles::NAICS2, roles::YEAR] {
            if self.columns.fact.get(role).is_none() {
                return Err(SanityError::Config(format!(
                    "fact: key column '{}' missing from column map",
                    role
                )));
            }
        }
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(SanityError::Config(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    d
                )));
            }
        }
        if self.top_n == 0 {
            return Err(SanityError::Config("top_n must be at least 1".to_string()));
        }
        if !(0.0..=100.0).contains(&self.max_ragged_row_pct) {
            return Err(SanityError::Config(format!(
                "max_ragged_row_pct must be within 0..=100, got {}",
                self.max_ragged_row_pct
            )));
        }
        Ok(())
    }

    /// Delimiter as a byte for the CSV reader.
    pub fn delimiter_byte(&self) -> Option<u8> {
        // validate() guarantees ASCII
        self.delimiter.map(|d| d as u8)
    }

    /// Whether a cell holds no value.
    pub fn is_null(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || self
                .null_tokens
                .iter()
                .any(|token| trimmed.eq_ignore_ascii_case(token))
    }
}
