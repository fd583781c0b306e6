//! Top-N outlier sampling for manual review.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::check::{CheckResult, CheckStage, Severity};
use super::context::CheckContext;
use super::engine::Validator;
use crate::config::roles;

/// One sampled row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRow {
    pub year: i64,
    pub fips: String,
    pub naics: String,
    pub value: f64,
}

/// Largest values of one metric, ranked within each year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSection {
    pub metric: String,
    /// Ascending by year, then descending by absolute value.
    pub rows: Vec<OutlierRow>,
}

/// Sample the top `top_n` rows per year for every configured outlier metric.
///
/// Rows are ranked by absolute value; ties keep file order. Metrics that did
/// not resolve, and rows without a parsed year or value, are skipped.
pub fn sample_outliers(ctx: &CheckContext<'_>) -> Vec<OutlierSection> {
    let Some(years) = ctx.fact_values.years.as_ref() else {
        return Vec::new();
    };
    let top_n = ctx.config.top_n;

    let mut sections = Vec::new();
    for metric in &ctx.config.outlier_metrics {
        let Some(values) = ctx.fact_values.metrics.get(metric) else {
            continue;
        };

        let mut by_year: BTreeMap<i64, Vec<(usize, f64)>> = BTreeMap::new();
        for (row, (year, value)) in years.iter().zip(values).enumerate() {
            if let (Some(year), Some(value)) = (year, value) {
                by_year.entry(*year).or_default().push((row, *value));
            }
        }

        let mut rows = Vec::new();
        for (year, mut ranked) in by_year {
            // sort_by is stable, so equal magnitudes stay in row order
            ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
            for (row, value) in ranked.into_iter().take(top_n) {
                rows.push(OutlierRow {
                    year,
                    fips: cell(ctx, row, roles::FIPS),
                    naics: cell(ctx, row, roles::NAICS2),
                    value,
                });
            }
        }

        sections.push(OutlierSection {
            metric: metric.clone(),
            rows,
        });
    }

    sections
}

fn cell(ctx: &CheckContext<'_>, row: usize, role: &str) -> String {
    ctx.fact
        .value(row, role)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Reports which metrics were sampled. Never fails.
pub struct OutlierValidator;

impl Validator for OutlierValidator {
    fn name(&self) -> &'static str {
        "outliers"
    }

    fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult> {
        let top_n = ctx.config.top_n;
        let (sampled, skipped): (Vec<&String>, Vec<&String>) = ctx
            .config
            .outlier_metrics
            .iter()
            .partition(|m| ctx.fact_values.metrics.contains_key(m.as_str()));

        let mut detail = if sampled.is_empty() {
            "No outlier metrics available.".to_string()
        } else {
            format!(
                "Top {} rows per year sampled for {}.",
                top_n,
                sampled.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
            )
        };
        if !skipped.is_empty() && ctx.fact_values.years.is_some() {
            detail.push_str(&format!(
                " Skipped unresolved: {}.",
                skipped.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
            ));
        }

        vec![CheckResult::new(
            CheckStage::Outliers,
            Severity::Warn,
            format!("outliers: sample top {}", top_n),
            true,
            detail,
        )]
    }
}
