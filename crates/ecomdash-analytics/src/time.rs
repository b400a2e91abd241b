//! Purchase timestamp normalization and calendar derivation.
//!
//! Timestamps are naive local times; no timezone conversion is applied
//! anywhere, so the calendar month of a row is the month written in the file.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse purchase timestamp text.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (optionally with `T`, fractional seconds or
/// without seconds) and a bare `YYYY-MM-DD`, which maps to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// A calendar month of a specific year; orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn of(instant: &NaiveDateTime) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar month number (1-12) of an instant.
pub fn month_of(instant: &NaiveDateTime) -> u32 {
    instant.month()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_standard_format() {
        let parsed = parse_timestamp("2017-10-02 10:56:33").unwrap();
        assert_eq!(parsed.year(), 2017);
        assert_eq!(parsed.month(), 10);
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.second(), 33);
    }

    #[test]
    fn test_parse_variants() {
        assert!(parse_timestamp("2017-10-02T10:56:33").is_some());
        assert!(parse_timestamp("2017-10-02 10:56:33.250").is_some());
        assert!(parse_timestamp("2017-10-02 10:56").is_some());
        assert!(parse_timestamp("  2017-10-02 10:56:33 ").is_some());

        let midnight = parse_timestamp("2017-10-02").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2017-13-02 10:00:00").is_none());
        assert!(parse_timestamp("02/10/2017 10:00").is_none());
    }

    #[test]
    fn test_year_month_orders_chronologically() {
        let mut months = vec![
            YearMonth { year: 2018, month: 1 },
            YearMonth { year: 2017, month: 12 },
            YearMonth { year: 2017, month: 2 },
        ];
        months.sort();
        let labels: Vec<_> = months.iter().map(YearMonth::label).collect();
        assert_eq!(labels, vec!["2017-02", "2017-12", "2018-01"]);
    }
}
