//! Check engine for the three-table export.

mod check;
mod context;
mod coverage;
mod engine;
mod format;
mod keys;
mod numeric;
mod outliers;
mod structure;

pub use check::{CheckResult, CheckStage, Severity, Status};
pub use context::{CheckContext, FactValues};
pub use coverage::{CoverageValidator, YearCoverage, null_rates_by_year, year_coverage};
pub use engine::{ValidationEngine, Validator};
pub use format::{FormatValidator, NumericStats, numeric_stats};
pub use keys::{DuplicateKey, KeyValidator, duplicate_keys};
pub use numeric::{NumericCell, YearCell, is_fips5, is_scientific};
pub use outliers::{OutlierRow, OutlierSection, OutlierValidator, sample_outliers};
pub use structure::StructureValidator;
