//! bnchmrk: sanity checks for the county x NAICS2 x year benchmarking export.
//!
//! Three CSV exports are checked together before a dataset ships: the fact
//! table and its NAICS and county reference tables. Every check yields a
//! PASS/FAIL result with a severity. A run fails when any ERROR check fails.
//!
//! # Example
//!
//! ```no_run
//! use bnchmrk::{ExportSanity, SanityInputs};
//!
//! let sanity = ExportSanity::new();
//! let inputs = SanityInputs::new("fact.csv", "naics.csv", "county.csv");
//! let report = sanity.run(&inputs).unwrap();
//!
//! println!("Status: {}", report.status.label());
//! report.write_artifacts("reports").unwrap();
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod report;
pub mod schema;
pub mod validation;

mod sanity;

pub use crate::sanity::{ExportSanity, SanityInputs};
pub use config::{SanityConfig, TableKind};
pub use error::{Result, SanityError};
pub use input::{Reader, SourceMetadata, Table};
pub use report::{ReportArtifacts, RunStatus, SanityReport};
pub use validation::{CheckResult, CheckStage, Severity, Status};
