//! Cell-level numeric parsing shared by the format and coverage checks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SanityConfig;

/// Plain or scientific decimal, e.g. `1.23E+10`.
static SCIENTIFIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)[eE][+-]?[0-9]+$").expect("valid regex"));

/// Five-digit county FIPS.
static FIPS5: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("valid regex"));

/// Parsed form of a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// Empty or a configured null token.
    Null,
    /// Finite number.
    Number(f64),
    /// Present but not a finite number.
    NonNumeric,
}

impl NumericCell {
    pub fn parse(value: &str, config: &SanityConfig) -> Self {
        if config.is_null(value) {
            return NumericCell::Null;
        }
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => NumericCell::Number(n),
            _ => NumericCell::NonNumeric,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            NumericCell::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// Parsed form of a year cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YearCell {
    Null,
    Integer(i64),
    /// Numeric with a fractional part, e.g. `2022.5`.
    Fractional,
    NonNumeric,
}

impl YearCell {
    /// `2022` and `2022.0` both parse as integer years.
    pub fn parse(value: &str, config: &SanityConfig) -> Self {
        if let Ok(year) = value.trim().parse::<i64>() {
            return YearCell::Integer(year);
        }
        match NumericCell::parse(value, config) {
            NumericCell::Null => YearCell::Null,
            NumericCell::NonNumeric => YearCell::NonNumeric,
            NumericCell::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                YearCell::Integer(n as i64)
            }
            NumericCell::Number(_) => YearCell::Fractional,
        }
    }

    pub fn year(self) -> Option<i64> {
        match self {
            YearCell::Integer(y) => Some(y),
            _ => None,
        }
    }
}

/// Whether a cell renders a number in scientific notation.
pub fn is_scientific(value: &str) -> bool {
    SCIENTIFIC.is_match(value.trim())
}

/// Whether a cell is a well-formed 5-digit county FIPS code.
pub fn is_fips5(value: &str) -> bool {
    FIPS5.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cell() {
        let config = SanityConfig::default();
        assert_eq!(NumericCell::parse("100", &config), NumericCell::Number(100.0));
        assert_eq!(NumericCell::parse(" -2.5 ", &config), NumericCell::Number(-2.5));
        assert_eq!(NumericCell::parse("1.23E+10", &config), NumericCell::Number(1.23e10));
        assert_eq!(NumericCell::parse("", &config), NumericCell::Null);
        assert_eq!(NumericCell::parse("NA", &config), NumericCell::Null);
        assert_eq!(NumericCell::parse("abc", &config), NumericCell::NonNumeric);
        assert_eq!(NumericCell::parse("1,234", &config), NumericCell::NonNumeric);
        assert_eq!(NumericCell::parse("inf", &config), NumericCell::NonNumeric);
    }

    #[test]
    fn test_scientific_detection() {
        assert!(is_scientific("1.23E+10"));
        assert!(is_scientific("5e3"));
        assert!(is_scientific(" -4.0e-2 "));
        assert!(!is_scientific("12300000000"));
        assert!(!is_scientific("abc"));
        assert!(!is_scientific("E10"));
    }

    #[test]
    fn test_year_cell() {
        let config = SanityConfig::default();
        assert_eq!(YearCell::parse("2022", &config), YearCell::Integer(2022));
        assert_eq!(YearCell::parse("2022.0", &config), YearCell::Integer(2022));
        assert_eq!(YearCell::parse("2022.5", &config), YearCell::Fractional);
        assert_eq!(YearCell::parse("", &config), YearCell::Null);
        assert_eq!(YearCell::parse("FY22", &config), YearCell::NonNumeric);
    }

    #[test]
    fn test_fips5() {
        assert!(is_fips5("48201"));
        assert!(is_fips5("06037"));
        assert!(!is_fips5("6037"));
        assert!(!is_fips5(" 48201"));
        assert!(!is_fips5("4820A"));
        assert!(!is_fips5("４８２０１"));
        assert!(!is_fips5("٤٨٢٠١"));
    }
}
