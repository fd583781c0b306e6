//! Run report: summary counts, key statistics and every check result.

mod markdown;
mod persistence;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::SourceMetadata;
use crate::validation::{
    CheckContext, CheckResult, DuplicateKey, NumericStats, OutlierSection, Severity, duplicate_keys,
    null_rates_by_year, numeric_stats, sample_outliers, year_coverage,
};

pub use markdown::Markdown;
pub use persistence::{ReportArtifacts, artifact_stem};

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Failure => "FAILURE",
        }
    }

    /// Process exit code for this status.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }
}

/// Metadata for the three input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInputs {
    pub fact: SourceMetadata,
    pub naics: SourceMetadata,
    pub county: SourceMetadata,
}

/// PASS/FAIL counts split by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub error_passed: usize,
    pub error_failed: usize,
    pub warn_passed: usize,
    pub warn_failed: usize,
}

impl CheckSummary {
    pub fn from_checks(checks: &[CheckResult]) -> Self {
        let mut summary = Self::default();
        for check in checks {
            match (check.severity, check.passed()) {
                (Severity::Error, true) => summary.error_passed += 1,
                (Severity::Error, false) => summary.error_failed += 1,
                (Severity::Warn, true) => summary.warn_passed += 1,
                (Severity::Warn, false) => summary.warn_failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.error_passed + self.error_failed + self.warn_passed + self.warn_failed
    }
}

/// Row and coverage statistics of the fact export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStats {
    pub rows: usize,
    /// Distinct parsed years, ascending.
    pub years: Vec<i64>,
    pub rows_by_year: BTreeMap<i64, usize>,
    pub distinct_counties_by_year: BTreeMap<i64, usize>,
    pub distinct_naics2_by_year: BTreeMap<i64, usize>,
    /// Null rate (%) per metric, per year.
    pub null_pct_by_year: IndexMap<String, BTreeMap<i64, f64>>,
}

impl KeyStats {
    pub fn collect(ctx: &CheckContext<'_>) -> Self {
        let mut stats = Self {
            rows: ctx.fact.row_count(),
            null_pct_by_year: null_rates_by_year(ctx),
            ..Self::default()
        };

        for c in year_coverage(ctx).unwrap_or_default() {
            stats.years.push(c.year);
            stats.rows_by_year.insert(c.year, c.rows);
            stats.distinct_counties_by_year.insert(c.year, c.counties);
            stats.distinct_naics2_by_year.insert(c.year, c.naics2);
        }

        stats
    }
}

/// Complete result of one sanity-check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityReport {
    /// Run start, UTC.
    pub run_timestamp: DateTime<Utc>,
    pub inputs: ReportInputs,
    pub summary: CheckSummary,
    pub status: RunStatus,
    pub key_stats: KeyStats,
    /// Repeated fact keys; empty when none or when the key did not resolve.
    pub duplicate_keys: Vec<DuplicateKey>,
    /// Failed join checks.
    pub missing_joins: Vec<CheckResult>,
    pub null_rates: Vec<NumericStats>,
    pub outliers: Vec<OutlierSection>,
    /// Every check in report order.
    pub checks: Vec<CheckResult>,
}

impl SanityReport {
    /// Assemble the report from a finished check pass.
    pub fn build(
        run_timestamp: DateTime<Utc>,
        inputs: ReportInputs,
        ctx: &CheckContext<'_>,
        checks: Vec<CheckResult>,
    ) -> Self {
        let summary = CheckSummary::from_checks(&checks);
        let status = if checks.iter().any(CheckResult::is_blocking) {
            RunStatus::Failure
        } else {
            RunStatus::Success
        };

        let missing_joins = checks
            .iter()
            .filter(|c| c.name.starts_with("join:") && !c.passed())
            .cloned()
            .collect();

        Self {
            run_timestamp,
            inputs,
            summary,
            status,
            key_stats: KeyStats::collect(ctx),
            duplicate_keys: duplicate_keys(ctx).unwrap_or_default(),
            missing_joins,
            null_rates: numeric_stats(ctx),
            outliers: sample_outliers(ctx),
            checks,
        }
    }

    /// Checks that fail the run.
    pub fn blocking_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.is_blocking())
    }

    pub fn to_markdown(&self) -> String {
        Markdown(self).to_string()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
