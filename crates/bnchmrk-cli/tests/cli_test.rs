//! End-to-end tests for the `bnchmrk` binary and its exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const FACT: &str = "year_num,state_cnty_fips_cd,naics2_sector_cd,abs_firms,abs_emp,abs_payroll_usd_amt,abs_rcpt_usd_amt,qcew_emp,qcew_wages_usd,qcew_avg_weekly_wage_usd\n\
                    2022,48201,42,10,100,1000,5000,90,900,50\n";
const NAICS: &str = "naics2_sector_cd,naics2_sector_name\n42,Wholesale Trade\n";
const COUNTY: &str = "state_cnty_fips_cd,county_name,state_abbr\n48201,Harris,TX\n";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn check(dir: &Path, fact: &str, extra: &[&str]) -> Output {
    let fact = write(dir, "fact.csv", fact);
    let naics = write(dir, "naics.csv", NAICS);
    let county = write(dir, "county.csv", COUNTY);

    Command::new(env!("CARGO_BIN_EXE_bnchmrk"))
        .arg("check")
        .arg("--fact")
        .arg(&fact)
        .arg("--naics")
        .arg(&naics)
        .arg("--county")
        .arg(&county)
        .arg("--outdir")
        .arg(dir.join("out"))
        .args(extra)
        .output()
        .expect("Failed to run bnchmrk")
}

fn reports(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("out"))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn test_clean_run_exits_zero() {
    let dir = TempDir::new().unwrap();
    let output = check(dir.path(), FACT, &[]);

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let names = reports(dir.path());
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("export_sanity_report_") && names[0].ends_with(".json"));
    assert!(names[1].ends_with(".md"));
}

#[test]
fn test_error_check_exits_one() {
    let dir = TempDir::new().unwrap();
    let fact = format!("{}2022,48201,42,10,100,1000,5000,90,900,50\n", FACT);
    let output = check(dir.path(), &fact, &["--json"]);

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "FAILURE");
    assert_eq!(json["duplicate_keys"][0]["row_count"], 2);
}

#[test]
fn test_missing_input_exits_two() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_bnchmrk"))
        .args(["check", "--fact", "missing.csv", "--naics", "n.csv", "--county", "c.csv"])
        .arg("--outdir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_usage_error_distinct_from_input_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_bnchmrk"))
        .args(["check", "--no-such-flag"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(64));

    let output = Command::new(env!("CARGO_BIN_EXE_bnchmrk"))
        .arg("--help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_config_command_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let output = Command::new(env!("CARGO_BIN_EXE_bnchmrk"))
        .args(["config", "--output"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let output = check(dir.path(), FACT, &["--config", path.to_str().unwrap(), "--top-n", "3"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("outliers: sample top 3"));
}
