//! Check results produced by the validators.

use serde::{Deserialize, Serialize};

/// Severity level of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational. A failure is surfaced but does not block shipment.
    Warn,
    /// A failure blocks shipment.
    Error,
}

impl Severity {
    /// Get the report label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
        }
    }
}

/// Stage that produced a check. Reports list checks in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStage {
    /// Parsing, headers and required columns.
    Structure,
    /// Value types, formats and signs.
    Format,
    /// Duplicate keys and cross-table joins.
    Keys,
    /// Per-year coverage against baselines.
    Coverage,
    /// Outlier samples for review.
    Outliers,
}

/// The result of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Stage that produced it.
    pub stage: CheckStage,
    /// Severity level.
    pub severity: Severity,
    /// Check identifier, e.g. `join: fact -> county`.
    pub name: String,
    /// Pass or fail.
    pub status: Status,
    /// Human-readable detail.
    pub detail: String,
}

impl CheckResult {
    /// Create a check result.
    pub fn new(
        stage: CheckStage,
        severity: Severity,
        name: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            severity,
            name: name.into(),
            status: if passed { Status::Pass } else { Status::Fail },
            detail: detail.into(),
        }
    }

    /// A failed check whose input column could not be resolved.
    pub fn unresolved(
        stage: CheckStage,
        severity: Severity,
        name: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        let columns = expected
            .iter()
            .map(|c| format!("'{}'", c))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            stage,
            severity,
            name,
            false,
            format!("Could not run: column(s) {} not resolved.", columns),
        )
    }

    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }

    /// Whether this result fails the run.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error && self.status == Status::Fail
    }
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity.label(),
            self.status.label(),
            self.name,
            self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_only_for_failed_errors() {
        let err_fail = CheckResult::new(CheckStage::Keys, Severity::Error, "fact: duplicate keys", false, "1 duplicate");
        let err_pass = CheckResult::new(CheckStage::Keys, Severity::Error, "fact: duplicate keys", true, "none");
        let warn_fail = CheckResult::new(CheckStage::Keys, Severity::Warn, "join: county extra keys", false, "1 unused");

        assert!(err_fail.is_blocking());
        assert!(!err_pass.is_blocking());
        assert!(!warn_fail.is_blocking());
    }

    #[test]
    fn test_unresolved_detail() {
        let check = CheckResult::unresolved(
            CheckStage::Format,
            Severity::Error,
            "fact: year_num parse",
            &["year_num"],
        );
        assert_eq!(check.status, Status::Fail);
        assert_eq!(check.detail, "Could not run: column(s) 'year_num' not resolved.");
    }

    #[test]
    fn test_serialized_labels() {
        let check = CheckResult::new(CheckStage::Structure, Severity::Warn, "x", true, "ok");
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["severity"], "WARN");
        assert_eq!(json["status"], "PASS");
        assert_eq!(json["stage"], "structure");
        assert_eq!(check.to_string(), "[WARN] PASS x: ok");
    }

    #[test]
    fn test_stage_ordering() {
        assert!(CheckStage::Structure < CheckStage::Format);
        assert!(CheckStage::Keys < CheckStage::Coverage);
        assert!(CheckStage::Coverage < CheckStage::Outliers);
    }
}
