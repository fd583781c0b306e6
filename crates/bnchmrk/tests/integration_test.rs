//! Integration tests for bnchmrk.

use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use bnchmrk::{
    CheckResult, ExportSanity, RunStatus, SanityConfig, SanityError, SanityInputs, SanityReport,
    Severity, Status,
};

const FACT_HEADER: &str = "year_num,state_cnty_fips_cd,naics2_sector_cd,abs_firms,abs_emp,abs_payroll_usd_amt,abs_rcpt_usd_amt,qcew_emp,qcew_wages_usd,qcew_avg_weekly_wage_usd";
const NAICS_HEADER: &str = "naics2_sector_cd,naics2_sector_name";
const COUNTY_HEADER: &str = "state_cnty_fips_cd,county_name,state_abbr";

/// Three export files in a temporary directory.
struct Fixture {
    dir: TempDir,
    inputs: SanityInputs,
}

impl Fixture {
    fn new(fact_rows: &[&str], naics_rows: &[&str], county_rows: &[&str]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let write = |name: &str, header: &str, rows: &[&str]| -> PathBuf {
            let path = dir.path().join(name);
            let mut content = format!("{}\n", header);
            for row in rows {
                content.push_str(row);
                content.push('\n');
            }
            fs::write(&path, content).expect("Failed to write fixture");
            path
        };

        let fact = write("fact.csv", FACT_HEADER, fact_rows);
        let naics = write("naics.csv", NAICS_HEADER, naics_rows);
        let county = write("county.csv", COUNTY_HEADER, county_rows);

        Self {
            inputs: SanityInputs::new(fact, naics, county),
            dir,
        }
    }

    fn clean() -> Self {
        Self::new(
            &[
                "2022,48201,42,10,100,1000,5000,90,900,50",
                "2022,06037,44,20,200,2000,9000,180,1800,60",
                "2023,48201,42,11,110,1100,5500,95,950,52",
            ],
            &["42,Wholesale Trade", "44,Retail Trade"],
            &["48201,Harris,TX", "06037,Los Angeles,CA"],
        )
    }

    fn run(&self) -> SanityReport {
        self.run_with(SanityConfig::default())
    }

    fn run_with(&self, config: SanityConfig) -> SanityReport {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ExportSanity::with_config(config)
            .expect("valid config")
            .run_at(&self.inputs, ts)
            .expect("run failed")
    }

    fn outdir(&self) -> PathBuf {
        self.dir.path().join("reports")
    }
}

fn find<'a>(report: &'a SanityReport, name: &str) -> &'a CheckResult {
    report
        .checks
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("missing check {}", name))
}

fn error_failures(report: &SanityReport) -> Vec<&str> {
    report.blocking_checks().map(|c| c.name.as_str()).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_duplicate_key_fails_run() {
    let fixture = Fixture::new(
        &[
            "2022,48201,42,10,100,1000,5000,90,900,50",
            "2022,48201,42,12,120,1200,6000,91,910,51",
        ],
        &["42,Wholesale Trade"],
        &["48201,Harris,TX"],
    );
    let report = fixture.run();

    assert_eq!(report.status, RunStatus::Failure);
    assert_eq!(report.status.exit_code(), 1);
    assert_eq!(report.duplicate_keys.len(), 1);
    let dup = &report.duplicate_keys[0];
    assert_eq!((dup.fips.as_str(), dup.naics.as_str(), dup.year.as_str()), ("48201", "42", "2022"));
    assert_eq!(dup.row_count, 2);
    assert_eq!(report.key_stats.rows, 2);
    assert_eq!(report.key_stats.rows_by_year[&2022], 2);
    assert_eq!(report.inputs.fact.row_count, 2);

    let check = find(&report, "fact: duplicate keys");
    assert_eq!(check.severity, Severity::Error);
    assert_eq!(check.status, Status::Fail);
    assert_eq!(error_failures(&report), vec!["fact: duplicate keys"]);
}

#[test]
fn test_unused_county_key_is_warning_only() {
    let fixture = Fixture::new(
        &["2022,48201,42,10,100,1000,5000,90,900,50"],
        &["42,Wholesale Trade"],
        &["48201,Harris,TX", "99999,Nowhere,ZZ"],
    );
    let report = fixture.run();

    assert_eq!(report.status, RunStatus::Success, "{:?}", error_failures(&report));
    let extra = find(&report, "join: county extra keys");
    assert_eq!(extra.severity, Severity::Warn);
    assert_eq!(extra.status, Status::Fail);
    assert_eq!(extra.detail, "1 county keys unused by fact: 99999");
    assert!(find(&report, "join: fact -> county").passed());
}

// =============================================================================
// Run properties
// =============================================================================

#[test]
fn test_clean_exports_succeed() {
    let report = Fixture::clean().run();

    assert_eq!(report.status, RunStatus::Success, "{:?}", error_failures(&report));
    assert_eq!(report.summary.error_failed, 0);
    assert_eq!(report.summary.total(), report.checks.len());
    assert!(report.duplicate_keys.is_empty());
    assert!(report.missing_joins.is_empty());

    assert_eq!(report.key_stats.rows, 3);
    assert_eq!(report.key_stats.years, vec![2022, 2023]);
    assert_eq!(report.key_stats.distinct_counties_by_year[&2022], 2);
    assert_eq!(report.inputs.fact.row_count, 3);
    assert_eq!(report.inputs.county.format, "csv");
    assert!(report.inputs.naics.hash.starts_with("sha256:"));
}

#[test]
fn test_checks_in_stage_order() {
    let report = Fixture::clean().run();
    let stages: Vec<_> = report.checks.iter().map(|c| c.stage).collect();
    let mut sorted = stages.clone();
    sorted.sort();
    assert_eq!(stages, sorted);
    assert_eq!(report.checks[0].name, "fact: CSV parses cleanly");
    assert!(report.checks.last().unwrap().name.starts_with("outliers: sample top"));
}

#[test]
fn test_idempotent() {
    let fixture = Fixture::clean();
    let first = fixture.run();
    let second = fixture.run();
    assert_eq!(first.checks, second.checks);
    assert_eq!(first, second);

    let later = ExportSanity::new().run(&fixture.inputs).unwrap();
    assert_eq!(first.checks, later.checks);
}

#[test]
fn test_join_toggles_with_reference_key() {
    let fact = ["2022,48201,42,10,100,1000,5000,90,900,50"];
    let naics = ["42,Wholesale Trade"];

    let without = Fixture::new(&fact, &naics, &["06037,Los Angeles,CA"]).run();
    let join = find(&without, "join: fact -> county");
    assert_eq!(join.status, Status::Fail);
    assert!(join.detail.contains("48201"));
    assert_eq!(without.missing_joins.len(), 2);
    assert_eq!(without.status, RunStatus::Failure);

    let with = Fixture::new(&fact, &naics, &["06037,Los Angeles,CA", "48201,Harris,TX"]).run();
    assert!(find(&with, "join: fact -> county").passed());
}

#[test]
fn test_unused_reference_rows_add_exactly_n_extra_keys() {
    let fact = ["2022,48201,42,10,100,1000,5000,90,900,50"];
    let naics = ["42,Wholesale Trade", "44,Retail Trade"];

    let base = Fixture::new(&fact, &naics, &["48201,Harris,TX"]).run();
    let more = Fixture::new(
        &fact,
        &naics,
        &["48201,Harris,TX", "01001,Autauga,AL", "01003,Baldwin,AL", "01005,Barbour,AL"],
    )
    .run();

    assert!(find(&base, "join: county extra keys").passed());
    let extra = find(&more, "join: county extra keys");
    assert!(extra.detail.starts_with("3 county keys unused by fact"));
    assert_eq!(error_failures(&base), error_failures(&more));
}

#[test]
fn test_scientific_and_non_numeric_cells() {
    let fixture = Fixture::new(
        &[
            "2022,48201,42,10,100,1000,1.23E+10,90,900,50",
            "2022,48201,44,10,100,1000,abc,90,900,50",
        ],
        &["42,Wholesale Trade", "44,Retail Trade"],
        &["48201,Harris,TX"],
    );
    let report = fixture.run();

    let receipts = report
        .null_rates
        .iter()
        .find(|s| s.metric == "abs_rcpt_usd_amt")
        .unwrap();
    assert_eq!(receipts.scientific_strings, 1);
    assert_eq!(receipts.non_numeric, 1);

    assert_eq!(find(&report, "formatting: scientific notation strings").status, Status::Fail);
    assert_eq!(find(&report, "fact: numeric parse summary").status, Status::Fail);
    // Both are WARN checks
    assert_eq!(report.status, RunStatus::Success, "{:?}", error_failures(&report));

    let sampled: Vec<f64> = report.outliers[0].rows.iter().map(|r| r.value).collect();
    assert_eq!(report.outliers[0].metric, "abs_rcpt_usd_amt");
    assert_eq!(sampled, vec![1.23e10]);
}

#[test]
fn test_warn_failures_never_change_status() {
    let report = Fixture::clean().run();
    // Default baselines expect 3283 counties
    assert!(report.summary.warn_failed > 0);
    assert_eq!(report.status, RunStatus::Success);
}

#[test]
fn test_malformed_table_still_reports_every_check() {
    let clean = Fixture::clean().run();
    let broken = Fixture::new(
        &["2022,48201,42,10,100,1000,5000,90,900,50,extra"],
        &["42,Wholesale Trade"],
        &["48201,Harris,TX"],
    )
    .run();

    let names = |r: &SanityReport| {
        r.checks
            .iter()
            .map(|c| c.name.clone())
            .filter(|n| !n.starts_with("coverage: distinct"))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&clean), names(&broken));
    assert_eq!(find(&broken, "fact: CSV parses cleanly").status, Status::Fail);
    assert_eq!(broken.status, RunStatus::Failure);
}

#[test]
fn test_county_key_derived_from_parts() {
    let dir = TempDir::new().unwrap();
    let fixture = Fixture::clean();
    let county = dir.path().join("county.csv");
    fs::write(
        &county,
        "state_fips,county_fips,county_name,state_abbr\n48,201,Harris,TX\n6,37,Los Angeles,CA\n",
    )
    .unwrap();
    let inputs = SanityInputs::new(&fixture.inputs.fact, &fixture.inputs.naics, &county);

    let report = ExportSanity::new().run(&inputs).unwrap();
    assert!(find(&report, "county: state_cnty_fips_cd available").passed());
    assert!(find(&report, "join: fact -> county").passed());
    assert_eq!(find(&report, "county: required columns").status, Status::Fail);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_baselines_and_top_n() {
    let fixture = Fixture::clean();
    let mut config = SanityConfig::default();
    config.baselines.expected_counties = 2;
    config.top_n = 1;

    let report = fixture.run_with(config);
    assert!(find(&report, "coverage: distinct counties 2022").passed());
    assert_eq!(find(&report, "coverage: distinct counties 2023").status, Status::Fail);
    assert!(report.checks.iter().any(|c| c.name == "outliers: sample top 1"));
    assert!(report.outliers.iter().all(|s| s.rows.len() <= 2));
}

#[test]
fn test_config_file_overrides_defaults() {
    let fixture = Fixture::clean();
    let path = fixture.dir.path().join("config.json");
    fs::write(&path, r#"{"top_n": 3, "baselines": {"expected_counties": 2}}"#).unwrap();

    let config = SanityConfig::load(&path).unwrap();
    assert_eq!(config.top_n, 3);
    assert_eq!(config.baselines.expected_counties, 2);
    assert_eq!(config.baselines.expected_naics2, 20);
    assert_eq!(config.sample_limit, 20);
}

#[test]
fn test_invalid_config_file() {
    let fixture = Fixture::clean();
    let path = fixture.dir.path().join("config.json");
    fs::write(&path, "{not json").unwrap();
    assert!(matches!(SanityConfig::load(&path), Err(SanityError::Config(_))));
}

// =============================================================================
// Input errors
// =============================================================================

#[test]
fn test_missing_file_is_input_error() {
    let fixture = Fixture::clean();
    let inputs = SanityInputs::new(
        fixture.dir.path().join("missing.csv"),
        &fixture.inputs.naics,
        &fixture.inputs.county,
    );
    let err = ExportSanity::new().run(&inputs).unwrap_err();
    assert!(matches!(err, SanityError::Io { .. }));
}

#[test]
fn test_empty_file_is_input_error() {
    let fixture = Fixture::clean();
    fs::write(&fixture.inputs.naics, "").unwrap();
    let err = ExportSanity::new().run(&fixture.inputs).unwrap_err();
    assert!(matches!(err, SanityError::EmptyFile(_)));
}

#[test]
fn test_non_utf8_is_input_error() {
    let fixture = Fixture::clean();
    fs::write(&fixture.inputs.county, b"state_cnty_fips_cd,county_name\n48201,Ca\xf1on\n").unwrap();
    let err = ExportSanity::new().run(&fixture.inputs).unwrap_err();
    assert!(matches!(err, SanityError::Encoding { .. }));
}

// =============================================================================
// Artifacts
// =============================================================================

#[test]
fn test_write_artifacts() {
    let fixture = Fixture::new(
        &[
            "2022,48201,42,10,100,1000,5000,90,900,50",
            "2022,48201,42,12,120,1200,6000,91,910,51",
        ],
        &["42,Wholesale Trade"],
        &["48201,Harris,TX"],
    );
    let report = fixture.run();
    let artifacts = report.write_artifacts(fixture.outdir()).unwrap();

    assert_eq!(
        artifacts.markdown.file_name().unwrap(),
        "export_sanity_report_20240501T120000Z.md"
    );
    assert_eq!(
        artifacts.json.file_name().unwrap(),
        "export_sanity_report_20240501T120000Z.json"
    );

    let markdown = fs::read_to_string(&artifacts.markdown).unwrap();
    for section in [
        "## Inputs",
        "## Summary",
        "## Key stats",
        "## Duplicate keys",
        "## Missing joins",
        "## Null-rate table",
        "## Sample outliers",
        "## Check details",
    ] {
        assert!(markdown.contains(section), "missing section {}", section);
    }
    assert!(markdown.contains("| 48201 | 42 | 2022 | 2 |"));
    assert!(markdown.contains("**FAILURE**"));

    let loaded = SanityReport::load(&artifacts.json).unwrap();
    assert_eq!(loaded, report);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&artifacts.json).unwrap()).unwrap();
    assert_eq!(json["status"], "FAILURE");
    assert_eq!(json["summary"]["error_failed"], 1);
    assert_eq!(json["checks"][0]["severity"], "ERROR");
}

#[test]
fn test_clean_report_shows_none() {
    let report = Fixture::clean().run();
    let markdown = report.to_markdown();
    let duplicates = markdown
        .split("## Duplicate keys")
        .nth(1)
        .unwrap();
    assert!(duplicates.trim_start().starts_with("_None_"));
}
