//! Column resolution through the column map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{TableContract, roles};
use crate::input::Table;

/// A contract column with no matching header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingColumn {
    /// Logical role.
    pub role: String,
    /// Literal header the export was expected to carry.
    pub expected: String,
    /// Whether the contract requires it.
    pub required: bool,
}

/// Header index per logical role, plus the roles that did not resolve.
#[derive(Debug, Clone, Default)]
pub struct ResolvedColumns {
    found: IndexMap<String, usize>,
    missing: Vec<MissingColumn>,
}

impl ResolvedColumns {
    /// Resolve every role of a contract against the table's headers.
    ///
    /// The first listed header present in the table wins.
    pub fn resolve(table: &Table, contract: &TableContract) -> Self {
        let mut found = IndexMap::new();
        let mut missing = Vec::new();

        for (role, spec) in &contract.columns {
            match spec.headers.iter().find_map(|h| table.column_index(h)) {
                Some(index) => {
                    found.insert(role.clone(), index);
                }
                None => missing.push(MissingColumn {
                    role: role.clone(),
                    expected: spec.expected().to_string(),
                    required: spec.required,
                }),
            }
        }

        Self { found, missing }
    }

    /// Header index for a role.
    pub fn index(&self, role: &str) -> Option<usize> {
        self.found.get(role).copied()
    }

    /// Roles that resolved, with their header index.
    pub fn found(&self) -> impl Iterator<Item = (&str, usize)> {
        self.found.iter().map(|(role, &i)| (role.as_str(), i))
    }

    /// Required roles with no matching header.
    pub fn missing_required(&self) -> impl Iterator<Item = &MissingColumn> {
        self.missing.iter().filter(|m| m.required)
    }

    /// All unresolved roles.
    pub fn missing(&self) -> &[MissingColumn] {
        &self.missing
    }
}

/// A table together with its resolved columns and any derived columns.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    pub table: &'a Table,
    pub columns: ResolvedColumns,
    derived: IndexMap<String, Vec<String>>,
}

impl<'a> TableView<'a> {
    /// Resolve a table against its contract.
    pub fn new(table: &'a Table, contract: &TableContract) -> Self {
        Self {
            table,
            columns: ResolvedColumns::resolve(table, contract),
            derived: IndexMap::new(),
        }
    }

    /// Whether a role is available, either from a header or derived.
    pub fn has(&self, role: &str) -> bool {
        self.derived.contains_key(role) || self.columns.index(role).is_some()
    }

    /// Whether a role was derived rather than read from a header.
    pub fn is_derived(&self, role: &str) -> bool {
        self.derived.contains_key(role)
    }

    /// All values of a role in row order.
    pub fn values(&self, role: &str) -> Option<Vec<&str>> {
        if let Some(values) = self.derived.get(role) {
            return Some(values.iter().map(String::as_str).collect());
        }
        let index = self.columns.index(role)?;
        Some(self.table.column_values(index).collect())
    }

    /// The value of a role in one row.
    pub fn value(&self, row: usize, role: &str) -> Option<&str> {
        if let Some(values) = self.derived.get(role) {
            return values.get(row).map(String::as_str);
        }
        self.table.get(row, self.columns.index(role)?)
    }

    /// Header literal a role resolved to.
    pub fn header(&self, role: &str) -> Option<&str> {
        self.columns
            .index(role)
            .and_then(|i| self.table.headers.get(i))
            .map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    fn insert_derived(&mut self, role: &str, values: Vec<String>) {
        self.derived.insert(role.to_string(), values);
    }
}

/// Build `state_cnty_fips_cd` from `state_fips` + `county_fips` when the
/// county export lacks the combined key.
///
/// Parts are zero-padded to 2 and 3 digits. Rows missing either part get an
/// empty key. Returns whether the key was derived.
pub fn derive_county_key(view: &mut TableView<'_>) -> bool {
    if view.has(roles::FIPS) {
        return false;
    }
    let (Some(states), Some(counties)) = (
        view.values(roles::STATE_FIPS),
        view.values(roles::COUNTY_FIPS),
    ) else {
        return false;
    };

    let keys: Vec<String> = states
        .iter()
        .zip(counties.iter())
        .map(|(state, county)| {
            let (state, county) = (state.trim(), county.trim());
            if state.is_empty() || county.is_empty() {
                String::new()
            } else {
                format!("{:0>2}{:0>3}", state, county)
            }
        })
        .collect();

    debug!(rows = keys.len(), "derived county FIPS key from state + county parts");
    view.insert_derived(roles::FIPS, keys);
    true
}
