//! Markdown rendering of a [`SanityReport`].

use std::fmt::{self, Write};

use super::SanityReport;

/// Renders a report as Markdown through `Display`.
pub struct Markdown<'a>(pub &'a SanityReport);

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "# Export sanity report")?;
        writeln!(f)?;
        writeln!(
            f,
            "- Run: {}",
            report.run_timestamp.format("%Y-%m-%dT%H:%M:%SZ")
        )?;
        writeln!(f, "- Status: **{}**", report.status.label())?;
        writeln!(f)?;

        inputs(f, report)?;
        summary(f, report)?;
        key_stats(f, report)?;
        duplicates(f, report)?;
        missing_joins(f, report)?;
        null_rates(f, report)?;
        outliers(f, report)?;
        check_details(f, report)
    }
}

fn inputs(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    writeln!(f, "## Inputs")?;
    writeln!(f)?;
    let tables = [
        ("fact", &report.inputs.fact),
        ("naics", &report.inputs.naics),
        ("county", &report.inputs.county),
    ];
    let rows = tables
        .iter()
        .map(|(name, meta)| {
            vec![
                name.to_string(),
                meta.path.display().to_string(),
                meta.format.clone(),
                meta.row_count.to_string(),
                meta.column_count.to_string(),
                meta.size_bytes.to_string(),
                meta.hash.chars().take(12).collect(),
            ]
        })
        .collect::<Vec<_>>();
    format_table(
        f,
        &["table", "path", "format", "rows", "columns", "bytes", "sha256"],
        &rows,
    )
}

fn summary(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    let s = &report.summary;
    writeln!(f, "## Summary")?;
    writeln!(f)?;
    format_table(
        f,
        &["severity", "PASS", "FAIL"],
        &[
            vec!["ERROR".into(), s.error_passed.to_string(), s.error_failed.to_string()],
            vec!["WARN".into(), s.warn_passed.to_string(), s.warn_failed.to_string()],
        ],
    )
}

fn key_stats(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    let stats = &report.key_stats;
    writeln!(f, "## Key stats")?;
    writeln!(f)?;
    writeln!(f, "- Fact rows: {}", stats.rows)?;
    let years = stats
        .years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(f, "- Years: {}", if years.is_empty() { "none" } else { years.as_str() })?;
    writeln!(f)?;

    if stats.years.is_empty() {
        return Ok(());
    }

    let mut headers = vec!["year".to_string(), "rows".into(), "counties".into(), "naics2".into()];
    headers.extend(stats.null_pct_by_year.keys().map(|m| format!("{} null %", m)));

    let rows = stats
        .years
        .iter()
        .map(|year| {
            let mut row = vec![
                year.to_string(),
                count(stats.rows_by_year.get(year)),
                count(stats.distinct_counties_by_year.get(year)),
                count(stats.distinct_naics2_by_year.get(year)),
            ];
            row.extend(
                stats
                    .null_pct_by_year
                    .values()
                    .map(|by_year| by_year.get(year).map(|p| format!("{:.2}", p)).unwrap_or_default()),
            );
            row
        })
        .collect::<Vec<_>>();

    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    format_table(f, &headers, &rows)
}

fn count(value: Option<&usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn duplicates(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    writeln!(f, "## Duplicate keys")?;
    writeln!(f)?;
    if report.duplicate_keys.is_empty() {
        writeln!(f, "_None_")?;
        return writeln!(f);
    }

    let rows = report
        .duplicate_keys
        .iter()
        .map(|d| {
            vec![
                d.fips.clone(),
                d.naics.clone(),
                d.year.clone(),
                d.row_count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    format_table(
        f,
        &["state_cnty_fips_cd", "naics2_sector_cd", "year_num", "rows"],
        &rows,
    )
}

fn missing_joins(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    writeln!(f, "## Missing joins")?;
    writeln!(f)?;
    if report.missing_joins.is_empty() {
        writeln!(f, "_None_")?;
        return writeln!(f);
    }
    for check in &report.missing_joins {
        writeln!(f, "- [{}] {}: {}", check.severity.label(), check.name, check.detail)?;
    }
    writeln!(f)
}

fn null_rates(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    writeln!(f, "## Null-rate table")?;
    writeln!(f)?;
    if report.null_rates.is_empty() {
        writeln!(f, "_No numeric columns resolved_")?;
        return writeln!(f);
    }

    let rows = report
        .null_rates
        .iter()
        .map(|s| {
            vec![
                s.metric.clone(),
                s.column.clone(),
                format!("{:.2}", s.null_pct),
                format!("{:.2}", s.non_numeric_pct),
                s.scientific_strings.to_string(),
                s.negatives.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    format_table(
        f,
        &["metric", "column", "null %", "non-numeric %", "scientific", "negative"],
        &rows,
    )
}

fn outliers(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    writeln!(f, "## Sample outliers")?;
    writeln!(f)?;
    if report.outliers.is_empty() {
        writeln!(f, "_None_")?;
        return writeln!(f);
    }

    for section in &report.outliers {
        writeln!(f, "### {}", section.metric)?;
        writeln!(f)?;
        let rows = section
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.year.to_string(),
                    r.fips.clone(),
                    r.naics.clone(),
                    r.value.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        format_table(f, &["year", "fips", "naics2", "value"], &rows)?;
    }
    Ok(())
}

fn check_details(f: &mut fmt::Formatter<'_>, report: &SanityReport) -> fmt::Result {
    writeln!(f, "## Check details")?;
    writeln!(f)?;
    let rows = report
        .checks
        .iter()
        .map(|c| {
            vec![
                c.severity.label().to_string(),
                c.status.label().to_string(),
                c.name.clone(),
                c.detail.clone(),
            ]
        })
        .collect::<Vec<_>>();
    format_table(f, &["severity", "status", "check", "detail"], &rows)
}

/// Write a Markdown table followed by a blank line. Pipes in cells are escaped.
fn format_table(f: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> fmt::Result {
    writeln!(f, "| {} |", headers.join(" | "))?;
    writeln!(
        f,
        "|{}|",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    )?;
    for row in rows {
        let cells = row
            .iter()
            .map(|c| c.replace('|', "\\|"))
            .collect::<Vec<_>>();
        writeln!(f, "| {} |", cells.join(" | "))?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_escapes_pipes() {
        let mut out = String::new();
        format_table(
            &mut out,
            &["a", "b"],
            &[vec!["1".into(), "x|y".into()]],
        )
        .unwrap();
        assert_eq!(out, "| a | b |\n|---|---|\n| 1 | x\\|y |\n\n");
    }
}
