//! Column map: logical column roles to the literal headers each export uses.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Logical column roles shared by the checks.
pub mod roles {
    pub const FIPS: &str = "state_cnty_fips_cd";
    pub const NAICS2: &str = "naics2_sector_cd";
    pub const YEAR: &str = "year_num";
    pub const NAICS2_NAME: &str = "naics2_sector_name";
    pub const STATE_FIPS: &str = "state_fips";
    pub const COUNTY_FIPS: &str = "county_fips";
    pub const COUNTY_NAME: &str = "county_name";
    pub const STATE_ABBR: &str = "state_abbr";

    pub const ABS_FIRMS: &str = "abs_firms";
    pub const ABS_EMP: &str = "abs_emp";
    pub const ABS_PAYROLL: &str = "abs_payroll_usd_amt";
    pub const ABS_RECEIPTS: &str = "abs_rcpt_usd_amt";
    pub const QCEW_EMP: &str = "qcew_emp";
    pub const QCEW_WAGES: &str = "qcew_wages_usd";
    pub const QCEW_AVG_WEEKLY_WAGE: &str = "qcew_avg_weekly_wage_usd";
}

/// The three exports a run validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// County x NAICS2 x year benchmarking fact export.
    Fact,
    /// NAICS2 sector reference.
    Naics,
    /// County FIPS reference.
    County,
}

impl TableKind {
    /// All tables in report order.
    pub const ALL: [TableKind; 3] = [TableKind::Fact, TableKind::Naics, TableKind::County];

    /// Label used as the check-name prefix.
    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Fact => "fact",
            TableKind::Naics => "naics",
            TableKind::County => "county",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a numeric metric is interpreted by the negative-value checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Firm or employment count. Negative values are impossible.
    Count,
    /// Dollar amount. Negative values occur as source-feed adjustments.
    Dollar,
}

/// Accepted headers for one logical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Literal header names, expected name first, then tolerated aliases.
    pub headers: Vec<String>,
    /// Whether the column must be present.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Set for numeric metric columns of the fact table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricKind>,
}

fn default_required() -> bool {
    true
}

impl ColumnSpec {
    /// A required column.
    pub fn required(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            required: true,
            metric: None,
        }
    }

    /// An optional column.
    pub fn optional(headers: &[&str]) -> Self {
        Self {
            required: false,
            ..Self::required(headers)
        }
    }

    /// Mark the column as a numeric metric.
    pub fn with_metric(mut self, kind: MetricKind) -> Self {
        self.metric = Some(kind);
        self
    }

    /// The header name the export is expected to carry.
    pub fn expected(&self) -> &str {
        self.headers.first().map(String::as_str).unwrap_or_default()
    }
}

/// Expected columns of one export, keyed by logical role in report order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableContract {
    pub columns: IndexMap<String, ColumnSpec>,
}

impl TableContract {
    /// Add a column to the contract.
    pub fn with(mut self, role: &str, spec: ColumnSpec) -> Self {
        self.columns.insert(role.to_string(), spec);
        self
    }

    /// Look up the column spec for a role.
    pub fn get(&self, role: &str) -> Option<&ColumnSpec> {
        self.columns.get(role)
    }

    /// Metric columns and their kinds, in contract order.
    pub fn metrics(&self) -> impl Iterator<Item = (&str, MetricKind)> {
        self.columns
            .iter()
            .filter_map(|(role, spec)| spec.metric.map(|kind| (role.as_str(), kind)))
    }
}

/// Column contracts for all three exports.
///
/// A table left out of a config file keeps its default contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub fact: TableContract,
    pub naics: TableContract,
    pub county: TableContract,
}

impl ColumnMap {
    /// Contract for a table.
    pub fn contract(&self, kind: TableKind) -> &TableContract {
        match kind {
            TableKind::Fact => &self.fact,
            TableKind::Naics => &self.naics,
            TableKind::County => &self.county,
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        let fact = TableContract::default()
            .with(roles::YEAR, ColumnSpec::required(&["year_num", "year"]))
            .with(
                roles::FIPS,
                ColumnSpec::required(&["state_cnty_fips_cd", "county_fips", "fips"]),
            )
            .with(
                roles::NAICS2,
                ColumnSpec::required(&["naics2_sector_cd", "naics2", "naics2_cd"]),
            )
            .with(
                roles::ABS_FIRMS,
                ColumnSpec::required(&["abs_firms", "abs_num_firms", "abs_firm_num"])
                    .with_metric(MetricKind::Count),
            )
            .with(
                roles::ABS_EMP,
                ColumnSpec::required(&["abs_emp", "abs_employment", "abs_emp_num"])
                    .with_metric(MetricKind::Count),
            )
            .with(
                roles::ABS_PAYROLL,
                ColumnSpec::required(&["abs_payroll_usd_amt", "abs_payroll"])
                    .with_metric(MetricKind::Dollar),
            )
            .with(
                roles::ABS_RECEIPTS,
                ColumnSpec::required(&["abs_rcpt_usd_amt", "abs_receipts"])
                    .with_metric(MetricKind::Dollar),
            )
            .with(
                roles::QCEW_EMP,
                ColumnSpec::required(&["qcew_emp", "qcew_employment", "qcew_ann_avg_emp_lvl_num"])
                    .with_metric(MetricKind::Count),
            )
            .with(
                roles::QCEW_WAGES,
                ColumnSpec::required(&["qcew_wages_usd", "qcew_wages", "qcew_ttl_ann_wage_usd_amt"])
                    .with_metric(MetricKind::Dollar),
            )
            .with(
                roles::QCEW_AVG_WEEKLY_WAGE,
                ColumnSpec::required(&[
                    "qcew_avg_weekly_wage_usd",
                    "qcew_avg_weekly_wage",
                    "qcew_avg_wkly_wage_usd_amt",
                ])
                .with_metric(MetricKind::Dollar),
            );

        let naics = TableContract::default()
            .with(
                roles::NAICS2,
                ColumnSpec::required(&["naics2_sector_cd", "naics2", "naics2_cd"]),
            )
            .with(
                roles::NAICS2_NAME,
                ColumnSpec::required(&[
                    "naics2_sector_name",
                    "sector_name",
                    "sector_label",
                    "naics2_name",
                    "naics2_sector_desc",
                ]),
            );

        let county = TableContract::default()
            // "county_fips" is the 3-digit part here, not an alias of the full key.
            .with(roles::FIPS, ColumnSpec::required(&["state_cnty_fips_cd", "fips"]))
            .with(roles::STATE_FIPS, ColumnSpec::optional(&["state_fips", "state_fips_cd"]))
            .with(roles::COUNTY_FIPS, ColumnSpec::optional(&["county_fips", "county_fips_cd"]))
            .with(
                roles::COUNTY_NAME,
                ColumnSpec::required(&["county_name", "cnty_name", "cnty_nm"]),
            )
            .with(roles::STATE_ABBR, ColumnSpec::required(&["state_abbr", "state_cd"]));

        Self { fact, naics, county }
    }
}
