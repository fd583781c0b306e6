//! Structural checks: parsing, headers and required columns.

use std::collections::HashSet;

use super::check::{CheckResult, CheckStage, Severity};
use super::context::CheckContext;
use super::engine::Validator;
use crate::config::{TableKind, roles};
use crate::schema::TableView;

/// Validates that each table parsed cleanly and carries its contract columns.
pub struct StructureValidator;

impl Validator for StructureValidator {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult> {
        let mut checks = Vec::new();

        for kind in TableKind::ALL {
            let view = ctx.view(kind);
            checks.push(parses_cleanly(view));
            checks.push(delimiter_sanity(view, ctx.config.max_ragged_row_pct));
            checks.push(non_empty_headers(view));
            checks.push(unique_headers(view));
            checks.push(required_columns(view));
        }

        checks.push(county_key_available(&ctx.county));

        checks
    }
}

fn check(kind: TableKind, name: &str, passed: bool, detail: impl Into<String>) -> CheckResult {
    CheckResult::new(
        CheckStage::Structure,
        Severity::Error,
        format!("{}: {}", kind, name),
        passed,
        detail,
    )
}

fn parses_cleanly(view: &TableView<'_>) -> CheckResult {
    let anomalies = &view.table.anomalies;
    if anomalies.is_empty() {
        return check(view.table.kind, "CSV parses cleanly", true, "Parsed without malformed rows.");
    }

    let shown = anomalies
        .iter()
        .take(3)
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    let more = if anomalies.len() > 3 { "; ..." } else { "" };
    check(
        view.table.kind,
        "CSV parses cleanly",
        false,
        format!("{} malformed row(s): {}{}", anomalies.len(), shown, more),
    )
}

fn delimiter_sanity(view: &TableView<'_>, max_ragged_pct: f64) -> CheckResult {
    let table = view.table;
    let columns = table.column_count();

    if columns <= 1 {
        return check(
            table.kind,
            "delimiter sanity",
            false,
            format!("Parsed {} column(s); possible delimiter issue.", columns),
        );
    }

    let ragged = table.ragged_rows();
    // Malformed rows were dropped, count them against the row total too
    let total = table.row_count() + (table.anomalies.len() - ragged);
    let pct = if total == 0 {
        0.0
    } else {
        ragged as f64 / total as f64 * 100.0
    };

    if ragged > 0 && pct > max_ragged_pct {
        check(
            table.kind,
            "delimiter sanity",
            false,
            format!(
                "Parsed {} columns; {} of {} rows ({:.2}%) have a different field count.",
                columns, ragged, total, pct
            ),
        )
    } else {
        check(table.kind, "delimiter sanity", true, format!("Parsed {} columns.", columns))
    }
}

fn non_empty_headers(view: &TableView<'_>) -> CheckResult {
    let blanks: Vec<String> = view
        .table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_empty())
        .map(|(i, _)| (i + 1).to_string())
        .collect();

    if blanks.is_empty() {
        check(view.table.kind, "non-empty headers", true, "All column names present.")
    } else {
        check(
            view.table.kind,
            "non-empty headers",
            false,
            format!("Empty column name at position(s) {}.", blanks.join(", ")),
        )
    }
}

fn unique_headers(view: &TableView<'_>) -> CheckResult {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for header in &view.table.headers {
        if !seen.insert(header.as_str()) && !duplicates.contains(&header.as_str()) {
            duplicates.push(header.as_str());
        }
    }

    if duplicates.is_empty() {
        check(view.table.kind, "unique headers", true, "Column names are unique.")
    } else {
        let names = duplicates
            .iter()
            .map(|d| format!("'{}'", d))
            .collect::<Vec<_>>()
            .join(", ");
        check(
            view.table.kind,
            "unique headers",
            false,
            format!("Duplicate column names found: {}.", names),
        )
    }
}

fn required_columns(view: &TableView<'_>) -> CheckResult {
    let missing: Vec<&str> = view
        .columns
        .missing_required()
        .map(|m| m.expected.as_str())
        .collect();

    if missing.is_empty() {
        check(view.table.kind, "required columns", true, "All required columns present.")
    } else {
        check(
            view.table.kind,
            "required columns",
            false,
            format!("Missing columns: {}", missing.join(", ")),
        )
    }
}

fn county_key_available(view: &TableView<'_>) -> CheckResult {
    let name = "state_cnty_fips_cd available";
    if view.is_derived(roles::FIPS) {
        check(
            TableKind::County,
            name,
            true,
            "Derived from state_fips + county_fips.",
        )
    } else if let Some(header) = view.header(roles::FIPS) {
        check(TableKind::County, name, true, format!("Read from column '{}'.", header))
    } else {
        check(
            TableKind::County,
            name,
            false,
            "Missing state_cnty_fips_cd or derivable state_fips + county_fips.",
        )
    }
}
