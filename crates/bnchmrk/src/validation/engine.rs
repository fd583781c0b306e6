//! Validator trait and the engine that runs validators in report order.

use tracing::debug;

use super::check::CheckResult;
use super::context::CheckContext;
use super::coverage::CoverageValidator;
use super::format::FormatValidator;
use super::keys::KeyValidator;
use super::outliers::OutlierValidator;
use super::structure::StructureValidator;

/// Trait for validators.
pub trait Validator {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run validation and return check results.
    fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult>;
}

/// Runs every validator in stage order.
///
/// Validators never short-circuit each other. A failed structural check is
/// reported alongside every later check that could still run.
pub struct ValidationEngine {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidationEngine {
    /// Create a new validation engine with all default validators.
    pub fn new() -> Self {
        Self {
            validators: vec![
                Box::new(StructureValidator),
                Box::new(FormatValidator),
                Box::new(KeyValidator),
                Box::new(CoverageValidator),
                Box::new(OutlierValidator),
            ],
        }
    }

    /// Run all validators and collect results.
    pub fn validate(&self, ctx: &CheckContext<'_>) -> Vec<CheckResult> {
        let mut all_checks = Vec::new();

        for validator in &self.validators {
            let checks = validator.validate(ctx);
            for check in &checks {
                debug!(
                    check = %check.name,
                    severity = check.severity.label(),
                    status = check.status.label(),
                    "check"
                );
            }
            debug!(
                validator = validator.name(),
                checks = checks.len(),
                failed = checks.iter().filter(|c| !c.passed()).count(),
                "validator finished"
            );
            all_checks.extend(checks);
        }

        // Stable: keeps each validator's own order within a stage
        all_checks.sort_by_key(|c| c.stage);

        all_checks
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}
