//! Shared inputs for one validation pass.

use indexmap::IndexMap;

use super::numeric::{NumericCell, YearCell};
use crate::config::{SanityConfig, TableKind, roles};
use crate::input::Table;
use crate::schema::{TableView, derive_county_key};

/// Fact values parsed once and reused by several checks.
#[derive(Debug, Clone, Default)]
pub struct FactValues {
    /// Integer year per row, `None` when the cell is not an integer year.
    /// `None` overall when the year column did not resolve.
    pub years: Option<Vec<Option<i64>>>,
    /// Parsed values per resolved metric, in contract order.
    pub metrics: IndexMap<String, Vec<Option<f64>>>,
}

impl FactValues {
    fn extract(view: &TableView<'_>, config: &SanityConfig) -> Self {
        let years = view.values(roles::YEAR).map(|cells| {
            cells
                .iter()
                .map(|cell| YearCell::parse(cell, config).year())
                .collect()
        });

        let mut metrics = IndexMap::new();
        for (role, _) in config.columns.fact.metrics() {
            if let Some(cells) = view.values(role) {
                let parsed = cells
                    .iter()
                    .map(|cell| NumericCell::parse(cell, config).value())
                    .collect();
                metrics.insert(role.to_string(), parsed);
            }
        }

        Self { years, metrics }
    }
}

/// Everything a validator needs: config, resolved tables, parsed fact values.
///
/// Column resolution is best effort. A check whose columns did not resolve
/// still reports, as a failure.
#[derive(Debug, Clone)]
pub struct CheckContext<'a> {
    pub config: &'a SanityConfig,
    pub fact: TableView<'a>,
    pub naics: TableView<'a>,
    pub county: TableView<'a>,
    pub fact_values: FactValues,
}

impl<'a> CheckContext<'a> {
    /// Resolve all three tables and parse the fact values.
    pub fn new(config: &'a SanityConfig, fact: &'a Table, naics: &'a Table, county: &'a Table) -> Self {
        let fact = TableView::new(fact, &config.columns.fact);
        let naics = TableView::new(naics, &config.columns.naics);
        let mut county = TableView::new(county, &config.columns.county);
        derive_county_key(&mut county);

        let fact_values = FactValues::extract(&fact, config);

        Self {
            config,
            fact,
            naics,
            county,
            fact_values,
        }
    }

    /// View of one table.
    pub fn view(&self, kind: TableKind) -> &TableView<'a> {
        match kind {
            TableKind::Fact => &self.fact,
            TableKind::Naics => &self.naics,
            TableKind::County => &self.county,
        }
    }

    /// The expected literal header for a role, for failure details.
    pub fn expected_header<'s>(&'s self, kind: TableKind, role: &'s str) -> &'s str {
        self.config
            .columns
            .contract(kind)
            .get(role)
            .map(|spec| spec.expected())
            .unwrap_or(role)
    }
}
