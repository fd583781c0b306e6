//! Resolving logical column roles against the headers a table actually has.

mod resolve;

pub use resolve::{MissingColumn, ResolvedColumns, TableView, derive_county_key};
