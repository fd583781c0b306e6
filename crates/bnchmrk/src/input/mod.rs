//! Input reading and table representation.

mod reader;
mod source;

pub use reader::{Reader, ReaderConfig};
pub use source::{ParseAnomaly, SourceMetadata, Table};
