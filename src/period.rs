use crate::error::{Result, SummaryError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// A calendar month, rendered as `YYYY-MM`.
///
/// Field order makes the derived `Ord` chronological, which also matches the
/// lexicographic order of the rendered keys since years are always four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(SummaryError::InvalidPeriod(format!(
                "Year {} is outside {}..={}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(SummaryError::InvalidPeriod(format!(
                "Month {} is outside 1..=12",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Moves the key by `months` calendar months, crossing year boundaries.
    pub fn shift_months(&self, months: i32) -> Result<Self> {
        let index = self.month_index() + i64::from(months);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        let year = i32::try_from(year).map_err(|_| {
            SummaryError::InvalidPeriod(format!("Shifting {} by {} months overflows", self, months))
        })?;
        Self::new(year, month)
    }

    fn month_index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || {
            SummaryError::InvalidPeriod(format!("Invalid period '{}'. Expected YYYY-MM", s))
        };

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = SummaryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

/// Period a date falls in, using its calendar fields as given.
pub fn period_key_of(date: NaiveDate) -> Result<PeriodKey> {
    PeriodKey::new(date.year(), date.month())
}

pub fn previous_period(key: PeriodKey) -> Result<PeriodKey> {
    key.shift_months(-1)
}

pub fn next_period(key: PeriodKey) -> Result<PeriodKey> {
    key.shift_months(1)
}

pub fn same_period_last_year(key: PeriodKey) -> Result<PeriodKey> {
    key.shift_months(-12)
}

/// Number of months from `start` to `end` (negative when `end` is earlier).
pub fn months_between(start: PeriodKey, end: PeriodKey) -> i64 {
    end.month_index() - start.month_index()
}

/// Every period from `start` to `end` inclusive, ascending. Empty when `end < start`.
pub fn periods_between(start: PeriodKey, end: PeriodKey) -> Vec<PeriodKey> {
    let mut periods = Vec::new();
    let mut current = start;

    while current <= end {
        periods.push(current);
        match next_period(current) {
            Ok(next) => current = next,
            Err(_) => break,
        }
    }

    periods
}

/// The `count` months ending at `end` (inclusive), oldest first.
pub fn trailing_periods(end: PeriodKey, count: u32) -> Result<Vec<PeriodKey>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let back = i32::try_from(count)
        .map_err(|_| SummaryError::InvalidPeriod(format!("Window of {} months is too large", count)))?;
    let start = end.shift_months(1 - back)?;
    Ok(periods_between(start, end))
}

/// Parses a period string in the format "YYYY-MM" or "YYYY-MM:YYYY-MM".
/// Returns (start, end)
pub fn parse_period_range(period: &str) -> Result<(PeriodKey, PeriodKey)> {
    let parts: Vec<&str> = period.split(':').collect();

    match parts.len() {
        1 => {
            let key: PeriodKey = parts[0].parse()?;
            Ok((key, key))
        }
        2 => {
            let start: PeriodKey = parts[0].parse()?;
            let end: PeriodKey = parts[1].parse()?;
            if end < start {
                return Err(SummaryError::InvalidPeriod(format!(
                    "Range '{}' ends before it starts",
                    period
                )));
            }
            Ok((start, end))
        }
        _ => Err(SummaryError::InvalidPeriod(format!(
            "Invalid period format: {}. Expected 'YYYY-MM' or 'YYYY-MM:YYYY-MM'",
            period
        ))),
    }
}

pub fn validate_fiscal_year_end_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(SummaryError::InvalidFiscalYearEndMonth(month));
    }
    Ok(())
}

/// The fiscal year a period belongs to, labelled by the calendar year in which
/// that fiscal year ends.
///
/// # Examples
/// - FY ends Dec (12): 2023-01..=2023-12 are all FY2023
/// - FY ends June (6): 2022-07..=2023-06 are FY2023
pub fn fiscal_year_of(period: PeriodKey, fiscal_year_end_month: u32) -> i32 {
    if period.month() <= fiscal_year_end_month {
        period.year()
    } else {
        period.year() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_period_key_of() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(period_key_of(date).unwrap().to_string(), "2023-01");

        let date = NaiveDate::from_ymd_opt(987, 11, 30).unwrap();
        assert_eq!(period_key_of(date).unwrap().to_string(), "0987-11");
    }

    #[test]
    fn test_period_key_of_rejects_out_of_range_year() {
        let date = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        assert!(matches!(
            period_key_of(date),
            Err(SummaryError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_previous_period() {
        assert_eq!(previous_period(key("2023-03")).unwrap(), key("2023-02"));
        assert_eq!(previous_period(key("2023-01")).unwrap(), key("2022-12"));
        assert!(previous_period(key("0001-01")).is_err());
    }

    #[test]
    fn test_previous_period_of_every_january() {
        for year in [2, 1999, 2000, 2023, 9999] {
            let date = NaiveDate::from_ymd_opt(year, 1, 20).unwrap();
            let prev = previous_period(period_key_of(date).unwrap()).unwrap();
            assert_eq!(prev.to_string(), format!("{:04}-12", year - 1));
        }
    }

    #[test]
    fn test_next_and_same_period_last_year() {
        assert_eq!(next_period(key("2023-12")).unwrap(), key("2024-01"));
        assert_eq!(same_period_last_year(key("2024-02")).unwrap(), key("2023-02"));
        assert!(next_period(key("9999-12")).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["2023-1", "23-01", "2023-13", "2023-00", "2023/01", "abcd-ef", "", "2023-01-01"] {
            assert!(bad.parse::<PeriodKey>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let mut keys = vec![key("2023-10"), key("2022-12"), key("2023-02"), key("0999-05")];
        let mut strings: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        keys.sort();
        strings.sort();
        let sorted: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(sorted, strings);
    }

    #[test]
    fn test_trailing_periods() {
        let periods = trailing_periods(key("2023-02"), 4).unwrap();
        let rendered: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["2022-11", "2022-12", "2023-01", "2023-02"]);

        assert!(trailing_periods(key("2023-02"), 0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_period_range() {
        let (start, end) = parse_period_range("2023-02").unwrap();
        assert_eq!(start, end);

        let (start, end) = parse_period_range("2023-01:2023-03").unwrap();
        assert_eq!(months_between(start, end), 2);
        assert_eq!(periods_between(start, end).len(), 3);

        assert!(parse_period_range("2023-03:2023-01").is_err());
        assert!(parse_period_range("2023-01:2023-02:2023-03").is_err());
    }

    #[test]
    fn test_fiscal_year_of() {
        assert_eq!(fiscal_year_of(key("2023-01"), 12), 2023);
        assert_eq!(fiscal_year_of(key("2023-12"), 12), 2023);

        // June year end (FY starts July)
        assert_eq!(fiscal_year_of(key("2022-07"), 6), 2023);
        assert_eq!(fiscal_year_of(key("2023-06"), 6), 2023);
        assert_eq!(fiscal_year_of(key("2023-07"), 6), 2024);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&key("2023-04")).unwrap();
        assert_eq!(json, "\"2023-04\"");
        let back: PeriodKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("2023-04"));
        assert!(serde_json::from_str::<PeriodKey>("\"2023-4\"").is_err());
    }
}
