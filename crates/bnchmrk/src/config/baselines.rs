//! Expected coverage per vintage.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Per-year overrides of the expected coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearBaseline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counties: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naics2: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

/// Expected years and per-year distinct counts for the fact export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Baselines {
    /// Vintages the export is expected to contain.
    pub expected_years: BTreeSet<i64>,
    /// Distinct counties expected in every year.
    pub expected_counties: usize,
    /// Distinct NAICS2 sectors expected in every year.
    pub expected_naics2: usize,
    /// Overrides keyed by year.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub years: BTreeMap<i64, YearBaseline>,
}

impl Default for Baselines {
    fn default() -> Self {
        Self {
            expected_years: BTreeSet::from([2022, 2023]),
            expected_counties: 3283,
            expected_naics2: 20,
            years: BTreeMap::new(),
        }
    }
}

impl Baselines {
    /// Expected distinct counties for a year.
    pub fn counties_for(&self, year: i64) -> usize {
        self.years
            .get(&year)
            .and_then(|b| b.counties)
            .unwrap_or(self.expected_counties)
    }

    /// Expected distinct NAICS2 sectors for a year.
    pub fn naics2_for(&self, year: i64) -> usize {
        self.years
            .get(&year)
            .and_then(|b| b.naics2)
            .unwrap_or(self.expected_naics2)
    }

    /// Expected row count for a year, if one is configured.
    pub fn rows_for(&self, year: i64) -> Option<usize> {
        self.years.get(&year).and_then(|b| b.rows)
    }

    pub fn is_expected_year(&self, year: i64) -> bool {
        self.expected_years.contains(&year)
    }
}
