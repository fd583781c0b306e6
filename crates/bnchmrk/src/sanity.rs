//! Main ExportSanity struct and public API.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::{SanityConfig, TableKind};
use crate::error::Result;
use crate::input::{Reader, ReaderConfig, SourceMetadata, Table};
use crate::report::{ReportInputs, SanityReport};
use crate::validation::{CheckContext, CheckResult, ValidationEngine};

/// Paths of the three exports checked together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityInputs {
    pub fact: PathBuf,
    pub naics: PathBuf,
    pub county: PathBuf,
}

impl SanityInputs {
    pub fn new(fact: impl Into<PathBuf>, naics: impl Into<PathBuf>, county: impl Into<PathBuf>) -> Self {
        Self {
            fact: fact.into(),
            naics: naics.into(),
            county: county.into(),
        }
    }

    fn path(&self, kind: TableKind) -> &Path {
        match kind {
            TableKind::Fact => &self.fact,
            TableKind::Naics => &self.naics,
            TableKind::County => &self.county,
        }
    }
}

/// The export sanity-check engine.
pub struct ExportSanity {
    config: SanityConfig,
    reader: Reader,
    engine: ValidationEngine,
}

impl ExportSanity {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        let config = SanityConfig::default();
        Self {
            reader: reader_for(&config),
            config,
            engine: ValidationEngine::new(),
        }
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: SanityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: reader_for(&config),
            config,
            engine: ValidationEngine::new(),
        })
    }

    pub fn config(&self) -> &SanityConfig {
        &self.config
    }

    /// Check the three exports. The run timestamp is taken now.
    ///
    /// Fails only when an input cannot be read at all. Every defect found in
    /// readable input is reported as a check result.
    pub fn run(&self, inputs: &SanityInputs) -> Result<SanityReport> {
        self.run_at(inputs, Utc::now())
    }

    /// Check the three exports with an explicit run timestamp.
    pub fn run_at(&self, inputs: &SanityInputs, run_timestamp: DateTime<Utc>) -> Result<SanityReport> {
        let (fact, fact_meta) = self.load(inputs, TableKind::Fact)?;
        let (naics, naics_meta) = self.load(inputs, TableKind::Naics)?;
        let (county, county_meta) = self.load(inputs, TableKind::County)?;

        let ctx = CheckContext::new(&self.config, &fact, &naics, &county);
        let checks = self.engine.validate(&ctx);

        let report = SanityReport::build(
            run_timestamp,
            ReportInputs {
                fact: fact_meta,
                naics: naics_meta,
                county: county_meta,
            },
            &ctx,
            checks,
        );

        info!(
            status = report.status.label(),
            error_failed = report.summary.error_failed,
            warn_failed = report.summary.warn_failed,
            "sanity run finished"
        );

        Ok(report)
    }

    /// Run every check over tables already in memory.
    pub fn check_tables(&self, fact: &Table, naics: &Table, county: &Table) -> Vec<CheckResult> {
        let ctx = CheckContext::new(&self.config, fact, naics, county);
        self.engine.validate(&ctx)
    }

    fn load(&self, inputs: &SanityInputs, kind: TableKind) -> Result<(Table, SourceMetadata)> {
        let path = inputs.path(kind);
        let (table, meta) = self.reader.read_table(path, kind)?;

        if !table.anomalies.is_empty() {
            warn!(
                table = %kind,
                anomalies = table.anomalies.len(),
                "table has malformed rows"
            );
        }
        info!(
            table = %kind,
            rows = meta.row_count,
            columns = meta.column_count,
            "loaded"
        );

        Ok((table, meta))
    }
}

impl Default for ExportSanity {
    fn default() -> Self {
        Self::new()
    }
}

fn reader_for(config: &SanityConfig) -> Reader {
    Reader::with_config(ReaderConfig {
        delimiter: config.delimiter_byte(),
        ..ReaderConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SanityError;

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = SanityConfig {
            top_n: 0,
            ..SanityConfig::default()
        };
        assert!(matches!(
            ExportSanity::with_config(config),
            Err(SanityError::Config(_))
        ));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let sanity = ExportSanity::new();
        let inputs = SanityInputs::new("/nonexistent/fact.csv", "/nonexistent/naics.csv", "/nonexistent/county.csv");
        assert!(matches!(sanity.run(&inputs), Err(SanityError::Io { .. })));
    }

    #[test]
    fn test_check_tables_in_memory() {
        let reader = Reader::new();
        let fact = reader
            .read_str(
                "year_num,state_cnty_fips_cd,naics2_sector_cd,abs_firms,abs_emp,abs_payroll_usd_amt,abs_rcpt_usd_amt,qcew_emp,qcew_wages_usd,qcew_avg_weekly_wage_usd\n\
                 2022,48201,42,1,1,1,1,1,1,1\n",
                TableKind::Fact,
            )
            .unwrap();
        let naics = reader
            .read_str("naics2_sector_cd,naics2_sector_name\n42,Wholesale Trade\n", TableKind::Naics)
            .unwrap();
        let county = reader
            .read_str("state_cnty_fips_cd,county_name,state_abbr\n48201,Harris,TX\n", TableKind::County)
            .unwrap();

        let checks = ExportSanity::new().check_tables(&fact, &naics, &county);
        assert!(!checks.is_empty());
        assert!(!checks.iter().any(|c| c.is_blocking()), "{:#?}", checks);
    }
}
