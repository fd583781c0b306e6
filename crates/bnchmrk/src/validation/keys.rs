//! Key uniqueness and join integrity between the fact and reference tables.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::check::{CheckResult, CheckStage, Severity};
use super::context::CheckContext;
use super::engine::Validator;
use crate::config::{SanityConfig, TableKind, roles};
use crate::schema::TableView;

/// A fact key that appears on more than one row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub fips: String,
    pub naics: String,
    pub year: String,
    pub row_count: usize,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{}) x{}", self.fips, self.naics, self.year, self.row_count)
    }
}

/// Group fact rows by (fips, naics, year) and return every repeated key.
///
/// Years are compared by their parsed value when they parse. Rows with a
/// blank key part are not grouped. `None` when any key column did not resolve.
pub fn duplicate_keys(ctx: &CheckContext<'_>) -> Option<Vec<DuplicateKey>> {
    let fips = ctx.fact.values(roles::FIPS)?;
    let naics = ctx.fact.values(roles::NAICS2)?;
    let years = ctx.fact.values(roles::YEAR)?;
    let parsed = ctx.fact_values.years.as_deref();

    let mut groups: BTreeMap<(&str, &str, String), usize> = BTreeMap::new();
    for (row, ((f, n), y)) in fips.iter().zip(&naics).zip(&years).enumerate() {
        let (f, n, y) = (f.trim(), n.trim(), y.trim());
        if [f, n, y].iter().any(|part| ctx.config.is_null(part)) {
            continue;
        }
        // `2022` and `2022.0` are the same year
        let year = match parsed.and_then(|years| years.get(row).copied().flatten()) {
            Some(year) => year.to_string(),
            None => y.to_string(),
        };
        *groups.entry((f, n, year)).or_insert(0) += 1;
    }

    Some(
        groups
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((fips, naics, year), row_count)| DuplicateKey {
                fips: fips.to_string(),
                naics: naics.to_string(),
                year,
                row_count,
            })
            .collect(),
    )
}

/// Trimmed, non-blank key values of a role.
fn key_values<'v>(view: &'v TableView<'_>, role: &str, config: &SanityConfig) -> Option<Vec<&'v str>> {
    let values = view.values(role)?;
    Some(
        values
            .into_iter()
            .map(str::trim)
            .filter(|v| !config.is_null(v))
            .collect(),
    )
}

fn sample(keys: &BTreeSet<&str>, limit: usize) -> String {
    let shown = keys.iter().take(limit).copied().collect::<Vec<_>>().join(", ");
    if keys.len() > limit {
        format!("{}, ...", shown)
    } else {
        shown
    }
}

/// Validates key uniqueness and fact-to-reference joins.
pub struct KeyValidator;

impl Validator for KeyValidator {
    fn name(&self) -> &'static str {
        "keys"
    }

    fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult> {
        let mut checks = vec![fact_duplicates(ctx)];

        for kind in [TableKind::County, TableKind::Naics] {
            checks.push(reference_unique(ctx, kind));
        }

        checks.extend(join(ctx, TableKind::County, roles::FIPS));
        checks.extend(join(ctx, TableKind::Naics, roles::NAICS2));

        checks
    }
}

fn fact_duplicates(ctx: &CheckContext<'_>) -> CheckResult {
    let name = "fact: duplicate keys";
    let Some(duplicates) = duplicate_keys(ctx) else {
        let expected: Vec<&str> = [roles::FIPS, roles::NAICS2, roles::YEAR]
            .into_iter()
            .filter(|role| !ctx.fact.has(role))
            .map(|role| ctx.expected_header(TableKind::Fact, role))
            .collect();
        return CheckResult::unresolved(CheckStage::Keys, Severity::Error, name, &expected);
    };

    if duplicates.is_empty() {
        return CheckResult::new(CheckStage::Keys, Severity::Error, name, true, "No duplicate keys.");
    }

    let limit = ctx.config.sample_limit;
    let mut listed = duplicates
        .iter()
        .take(limit)
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if duplicates.len() > limit {
        listed.push_str(", ...");
    }
    CheckResult::new(
        CheckStage::Keys,
        Severity::Error,
        name,
        false,
        format!("{} duplicate keys: {}", duplicates.len(), listed),
    )
}

fn reference_unique(ctx: &CheckContext<'_>, kind: TableKind) -> CheckResult {
    let role = match kind {
        TableKind::Naics => roles::NAICS2,
        _ => roles::FIPS,
    };
    let name = format!("{}: unique keys", kind);

    let Some(keys) = key_values(ctx.view(kind), role, ctx.config) else {
        return CheckResult::unresolved(
            CheckStage::Keys,
            Severity::Error,
            name,
            &[ctx.expected_header(kind, role)],
        );
    };

    let mut seen = BTreeSet::new();
    let mut repeated = BTreeSet::new();
    for key in keys {
        if !seen.insert(key) {
            repeated.insert(key);
        }
    }

    if repeated.is_empty() {
        CheckResult::new(CheckStage::Keys, Severity::Error, name, true, format!("{} keys are unique.", role))
    } else {
        CheckResult::new(
            CheckStage::Keys,
            Severity::Error,
            name,
            false,
            format!(
                "{} repeated {} values: {}",
                repeated.len(),
                role,
                sample(&repeated, ctx.config.sample_limit)
            ),
        )
    }
}

/// `join: fact -> <ref>` followed by `join: <ref> extra keys`.
fn join(ctx: &CheckContext<'_>, kind: TableKind, role: &str) -> [CheckResult; 2] {
    let missing_name = format!("join: fact -> {}", kind);
    let extra_name = format!("join: {} extra keys", kind);

    let fact_keys = key_values(&ctx.fact, role, ctx.config);
    let ref_keys = key_values(ctx.view(kind), role, ctx.config);

    let (Some(fact_keys), Some(ref_keys)) = (fact_keys, ref_keys) else {
        let mut expected = Vec::new();
        if !ctx.fact.has(role) {
            expected.push(ctx.expected_header(TableKind::Fact, role));
        }
        if !ctx.view(kind).has(role) {
            expected.push(ctx.expected_header(kind, role));
        }
        return [
            CheckResult::unresolved(CheckStage::Keys, Severity::Error, missing_name, &expected),
            CheckResult::unresolved(CheckStage::Keys, Severity::Warn, extra_name, &expected),
        ];
    };

    let fact_set: BTreeSet<&str> = fact_keys.iter().copied().collect();
    let ref_set: BTreeSet<&str> = ref_keys.into_iter().collect();
    let limit = ctx.config.sample_limit;

    let missing: BTreeSet<&str> = fact_set.difference(&ref_set).copied().collect();
    let missing_check = if missing.is_empty() {
        CheckResult::new(
            CheckStage::Keys,
            Severity::Error,
            missing_name,
            true,
            format!("All fact {} keys found in {}.", role, kind),
        )
    } else {
        let rows = fact_keys.iter().filter(|k| missing.contains(*k)).count();
        CheckResult::new(
            CheckStage::Keys,
            Severity::Error,
            missing_name,
            false,
            format!(
                "{} fact keys ({} rows) missing from {}: {}",
                missing.len(),
                rows,
                kind,
                sample(&missing, limit)
            ),
        )
    };

    let extra: BTreeSet<&str> = ref_set.difference(&fact_set).copied().collect();
    let extra_check = if extra.is_empty() {
        CheckResult::new(
            CheckStage::Keys,
            Severity::Warn,
            extra_name,
            true,
            format!("Every {} key is used by fact.", kind),
        )
    } else {
        CheckResult::new(
            CheckStage::Keys,
            Severity::Warn,
            extra_name,
            false,
            format!(
                "{} {} keys unused by fact: {}",
                extra.len(),
                kind,
                sample(&extra, limit)
            ),
        )
    };

    [missing_check, extra_check]
}
