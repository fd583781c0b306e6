//! Per-year coverage against expected baselines.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::check::{CheckResult, CheckStage, Severity};
use super::context::CheckContext;
use super::engine::Validator;
use crate::config::{TableKind, roles};

/// Row and distinct-key counts for one year of the fact export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCoverage {
    pub year: i64,
    pub rows: usize,
    pub counties: usize,
    pub naics2: usize,
}

/// Coverage per distinct parsed year, ascending.
///
/// Rows whose year does not parse are left out. `None` when the year, FIPS
/// or NAICS2 column did not resolve.
pub fn year_coverage(ctx: &CheckContext<'_>) -> Option<Vec<YearCoverage>> {
    let years = ctx.fact_values.years.as_ref()?;
    let fips = ctx.fact.values(roles::FIPS)?;
    let naics = ctx.fact.values(roles::NAICS2)?;

    let mut per_year: BTreeMap<i64, (usize, BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
    for (row, year) in years.iter().enumerate() {
        let Some(year) = year else { continue };
        let entry = per_year.entry(*year).or_default();
        entry.0 += 1;

        let f = fips[row].trim();
        if !ctx.config.is_null(f) {
            entry.1.insert(f);
        }
        let n = naics[row].trim();
        if !ctx.config.is_null(n) {
            entry.2.insert(n);
        }
    }

    Some(
        per_year
            .into_iter()
            .map(|(year, (rows, counties, naics2))| YearCoverage {
                year,
                rows,
                counties: counties.len(),
                naics2: naics2.len(),
            })
            .collect(),
    )
}

/// Null rate (%) per year for each configured null-rate metric that resolved.
pub fn null_rates_by_year(ctx: &CheckContext<'_>) -> IndexMap<String, BTreeMap<i64, f64>> {
    let mut rates = IndexMap::new();
    let Some(years) = ctx.fact_values.years.as_ref() else {
        return rates;
    };

    for metric in &ctx.config.null_rate_metrics {
        let Some(cells) = ctx.fact.values(metric) else {
            continue;
        };

        let mut counts: BTreeMap<i64, (usize, usize)> = BTreeMap::new();
        for (cell, year) in cells.iter().zip(years) {
            let Some(year) = year else { continue };
            let entry = counts.entry(*year).or_default();
            entry.0 += 1;
            if ctx.config.is_null(cell) {
                entry.1 += 1;
            }
        }

        let by_year = counts
            .into_iter()
            .map(|(year, (rows, nulls))| (year, nulls as f64 / rows as f64 * 100.0))
            .collect();
        rates.insert(metric.clone(), by_year);
    }

    rates
}

/// Validates per-year counts and ABS completeness.
pub struct CoverageValidator;

impl Validator for CoverageValidator {
    fn name(&self) -> &'static str {
        "coverage"
    }

    fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult> {
        let mut checks = per_year_checks(ctx);
        checks.push(partial_abs_rows(ctx));
        checks
    }
}

fn per_year_checks(ctx: &CheckContext<'_>) -> Vec<CheckResult> {
    let name = "coverage: per-year counts";
    let Some(coverage) = year_coverage(ctx) else {
        let expected: Vec<&str> = [roles::YEAR, roles::FIPS, roles::NAICS2]
            .into_iter()
            .filter(|role| !ctx.fact.has(role))
            .map(|role| ctx.expected_header(TableKind::Fact, role))
            .collect();
        return vec![CheckResult::unresolved(CheckStage::Coverage, Severity::Warn, name, &expected)];
    };

    if coverage.is_empty() {
        return vec![CheckResult::new(
            CheckStage::Coverage,
            Severity::Warn,
            name,
            false,
            "No rows with a parseable year_num.",
        )];
    }

    let baselines = &ctx.config.baselines;
    let mut checks = Vec::new();

    for c in &coverage {
        let expected = baselines.counties_for(c.year);
        checks.push(CheckResult::new(
            CheckStage::Coverage,
            Severity::Warn,
            format!("coverage: distinct counties {}", c.year),
            c.counties == expected,
            format!("{} distinct counties (expected {}).", c.counties, expected),
        ));
    }

    for c in &coverage {
        let expected = baselines.naics2_for(c.year);
        checks.push(CheckResult::new(
            CheckStage::Coverage,
            Severity::Warn,
            format!("coverage: distinct naics2 {}", c.year),
            c.naics2 == expected,
            format!("{} distinct NAICS2 sectors (expected {}).", c.naics2, expected),
        ));
    }

    for c in &coverage {
        if let Some(expected) = baselines.rows_for(c.year) {
            checks.push(CheckResult::new(
                CheckStage::Coverage,
                Severity::Warn,
                format!("coverage: rows {}", c.year),
                c.rows == expected,
                format!("{} rows (expected {}).", c.rows, expected),
            ));
        }
    }

    checks
}

/// Rows where some but not all ABS metrics carry a value.
fn partial_abs_rows(ctx: &CheckContext<'_>) -> CheckResult {
    let name = "coverage: partial ABS rows";
    let metrics = &ctx.config.abs_metrics;

    let columns: Vec<Option<Vec<&str>>> = metrics.iter().map(|m| ctx.fact.values(m)).collect();
    if columns.iter().any(Option::is_none) {
        let expected: Vec<&str> = metrics
            .iter()
            .filter(|m| !ctx.fact.has(m))
            .map(|m| ctx.expected_header(TableKind::Fact, m))
            .collect();
        return CheckResult::unresolved(CheckStage::Coverage, Severity::Warn, name, &expected);
    }
    let columns: Vec<Vec<&str>> = columns.into_iter().flatten().collect();

    let total = metrics.len();
    let partial = (0..ctx.fact.row_count())
        .filter(|&row| {
            let present = columns
                .iter()
                .filter(|cells| !ctx.config.is_null(cells[row]))
                .count();
            present > 0 && present < total
        })
        .count();

    if partial == 0 {
        CheckResult::new(CheckStage::Coverage, Severity::Warn, name, true, "ABS metrics are all-or-nothing per row.")
    } else {
        CheckResult::new(
            CheckStage::Coverage,
            Severity::Warn,
            name,
            false,
            format!("{} rows carry only some ABS metrics.", partial),
        )
    }
}
