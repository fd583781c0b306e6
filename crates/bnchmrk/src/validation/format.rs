//! Type and format checks on the fact export.
//!
//! A negative firm or employment count is an ERROR. A negative dollar
//! amount is only a WARN.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::check::{CheckResult, CheckStage, Severity};
use super::context::CheckContext;
use super::engine::Validator;
use super::numeric::{NumericCell, YearCell, is_fips5, is_scientific};
use crate::config::{MetricKind, TableKind, roles};

/// Per-metric parse statistics for the null-rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    /// Logical metric role.
    pub metric: String,
    /// Header the metric resolved to.
    pub column: String,
    pub kind: MetricKind,
    pub rows: usize,
    pub nulls: usize,
    pub non_numeric: usize,
    pub scientific_strings: usize,
    pub negatives: usize,
    pub null_pct: f64,
    pub non_numeric_pct: f64,
}

/// Compute parse statistics for every resolved fact metric, in contract order.
pub fn numeric_stats(ctx: &CheckContext<'_>) -> Vec<NumericStats> {
    let mut stats = Vec::new();

    for (role, kind) in ctx.config.columns.fact.metrics() {
        let Some(cells) = ctx.fact.values(role) else {
            continue;
        };

        let rows = cells.len();
        let mut nulls = 0;
        let mut non_numeric = 0;
        let mut scientific_strings = 0;
        let mut negatives = 0;

        for cell in &cells {
            match NumericCell::parse(cell, ctx.config) {
                NumericCell::Null => nulls += 1,
                NumericCell::NonNumeric => non_numeric += 1,
                NumericCell::Number(n) => {
                    if n < 0.0 {
                        negatives += 1;
                    }
                    if is_scientific(cell) {
                        scientific_strings += 1;
                    }
                }
            }
        }

        stats.push(NumericStats {
            metric: role.to_string(),
            column: ctx.fact.header(role).unwrap_or(role).to_string(),
            kind,
            rows,
            nulls,
            non_numeric,
            scientific_strings,
            negatives,
            null_pct: pct(nulls, rows),
            non_numeric_pct: pct(non_numeric, rows),
        });
    }

    stats
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Validates key formats, year values and numeric metric cells.
pub struct FormatValidator;

impl Validator for FormatValidator {
    fn name(&self) -> &'static str {
        "format"
    }

    fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult> {
        let mut checks = Vec::new();

        checks.push(fips_format(ctx));
        checks.extend(year_checks(ctx));
        checks.push(naics_non_null(ctx));

        let stats = numeric_stats(ctx);
        checks.push(numeric_parse_summary(&stats));
        checks.push(negatives(&stats, MetricKind::Count));
        checks.push(negatives(&stats, MetricKind::Dollar));
        checks.push(scientific_strings(&stats));

        checks
    }
}

fn fips_format(ctx: &CheckContext<'_>) -> CheckResult {
    let name = "fact: state_cnty_fips_cd format";
    let Some(values) = ctx.fact.values(roles::FIPS) else {
        return CheckResult::unresolved(
            CheckStage::Format,
            Severity::Error,
            name,
            &[ctx.expected_header(TableKind::Fact, roles::FIPS)],
        );
    };

    let bad: Vec<&str> = values.into_iter().filter(|v| !is_fips5(v)).collect();
    if bad.is_empty() {
        return CheckResult::new(
            CheckStage::Format,
            Severity::Error,
            name,
            true,
            "All FIPS codes are 5 digits.",
        );
    }

    let samples: BTreeSet<&str> = bad.iter().copied().collect();
    let samples = samples
        .into_iter()
        .take(5)
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ");
    CheckResult::new(
        CheckStage::Format,
        Severity::Error,
        name,
        false,
        format!(
            "{} rows have invalid FIPS (expected 5 digits), e.g. {}.",
            bad.len(),
            samples
        ),
    )
}

fn year_checks(ctx: &CheckContext<'_>) -> Vec<CheckResult> {
    let parse_name = "fact: year_num parse";
    let integer_name = "fact: year_num integer";
    let expected_name = "fact: year_num expected set";

    let Some(cells) = ctx.fact.values(roles::YEAR) else {
        let header = ctx.expected_header(TableKind::Fact, roles::YEAR);
        return vec![
            CheckResult::unresolved(CheckStage::Format, Severity::Error, parse_name, &[header]),
            CheckResult::unresolved(CheckStage::Format, Severity::Error, integer_name, &[header]),
            CheckResult::unresolved(CheckStage::Format, Severity::Warn, expected_name, &[header]),
        ];
    };

    let mut unparsed = 0;
    let mut fractional = 0;
    let mut years = BTreeSet::new();
    for cell in &cells {
        match YearCell::parse(cell, ctx.config) {
            YearCell::Integer(y) => {
                years.insert(y);
            }
            YearCell::Fractional => fractional += 1,
            YearCell::Null | YearCell::NonNumeric => unparsed += 1,
        }
    }

    let parse = if unparsed == 0 {
        CheckResult::new(CheckStage::Format, Severity::Error, parse_name, true, "All year_num values parse numeric.")
    } else {
        CheckResult::new(
            CheckStage::Format,
            Severity::Error,
            parse_name,
            false,
            format!("{} rows have non-numeric year_num.", unparsed),
        )
    };

    let integer = if fractional == 0 {
        CheckResult::new(CheckStage::Format, Severity::Error, integer_name, true, "All year_num values are integers.")
    } else {
        CheckResult::new(
            CheckStage::Format,
            Severity::Error,
            integer_name,
            false,
            format!("{} rows have non-integer year_num.", fractional),
        )
    };

    let unexpected: Vec<String> = years
        .iter()
        .filter(|y| !ctx.config.baselines.is_expected_year(**y))
        .map(|y| y.to_string())
        .collect();
    let expected = if unexpected.is_empty() {
        CheckResult::new(CheckStage::Format, Severity::Warn, expected_name, true, "Only expected years present.")
    } else {
        CheckResult::new(
            CheckStage::Format,
            Severity::Warn,
            expected_name,
            false,
            format!("Unexpected years present: [{}]", unexpected.join(", ")),
        )
    };

    vec![parse, integer, expected]
}

fn naics_non_null(ctx: &CheckContext<'_>) -> CheckResult {
    let name = "fact: naics2_sector_cd non-null";
    let Some(values) = ctx.fact.values(roles::NAICS2) else {
        return CheckResult::unresolved(
            CheckStage::Format,
            Severity::Error,
            name,
            &[ctx.expected_header(TableKind::Fact, roles::NAICS2)],
        );
    };

    let nulls = values.iter().filter(|v| ctx.config.is_null(v)).count();
    if nulls == 0 {
        CheckResult::new(CheckStage::Format, Severity::Error, name, true, "NAICS2 codes present.")
    } else {
        CheckResult::new(
            CheckStage::Format,
            Severity::Error,
            name,
            false,
            format!("{} rows have null NAICS2 codes.", nulls),
        )
    }
}

fn numeric_parse_summary(stats: &[NumericStats]) -> CheckResult {
    let name = "fact: numeric parse summary";
    let offenders: Vec<String> = stats
        .iter()
        .filter(|s| s.non_numeric > 0)
        .map(|s| format!("{} {:.2}%", s.metric, s.non_numeric_pct))
        .collect();

    if offenders.is_empty() {
        CheckResult::new(
            CheckStage::Format,
            Severity::Warn,
            name,
            true,
            format!("{} numeric columns parsed (see null-rate table).", stats.len()),
        )
    } else {
        CheckResult::new(
            CheckStage::Format,
            Severity::Warn,
            name,
            false,
            format!("Non-numeric values in: {}.", offenders.join(", ")),
        )
    }
}

fn negatives(stats: &[NumericStats], kind: MetricKind) -> CheckResult {
    let (name, severity, label) = match kind {
        MetricKind::Count => ("fact: negative firms/emp", Severity::Error, "firm/emp"),
        MetricKind::Dollar => ("fact: negative dollar values", Severity::Warn, "dollar"),
    };

    let per_metric: Vec<String> = stats
        .iter()
        .filter(|s| s.kind == kind && s.negatives > 0)
        .map(|s| format!("{}: {}", s.metric, s.negatives))
        .collect();
    let total: usize = stats
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.negatives)
        .sum();

    if total == 0 {
        CheckResult::new(
            CheckStage::Format,
            severity,
            name,
            true,
            format!("No negative {} values.", label),
        )
    } else {
        CheckResult::new(
            CheckStage::Format,
            severity,
            name,
            false,
            format!(
                "{} negative {} values ({}).",
                total,
                label,
                per_metric.join(", ")
            ),
        )
    }
}

fn scientific_strings(stats: &[NumericStats]) -> CheckResult {
    let name = "formatting: scientific notation strings";
    let total: usize = stats.iter().map(|s| s.scientific_strings).sum();

    if total == 0 {
        CheckResult::new(CheckStage::Format, Severity::Warn, name, true, "No scientific notation strings.")
    } else {
        CheckResult::new(
            CheckStage::Format,
            Severity::Warn,
            name,
            false,
            format!("{} numeric strings appear in scientific notation.", total),
        )
    }
}
