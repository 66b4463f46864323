//! Derived Table Types
//! Keyed summary tables produced by the aggregator.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Ordered `(key, value)` rows with unique keys.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable<K, V> {
    rows: Vec<(K, V)>,
}

impl<K, V> Default for DerivedTable<K, V> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<K: PartialEq, V> DerivedTable<K, V> {
    /// Wrap rows already grouped by key. Callers guarantee key uniqueness.
    pub fn from_rows(rows: Vec<(K, V)>) -> Self {
        debug_assert!(
            rows.iter()
                .enumerate()
                .all(|(i, (k, _))| rows[..i].iter().all(|(other, _)| other != k)),
            "derived table keys must be unique"
        );
        Self { rows }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.rows.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<K, V> DerivedTable<K, V> {
    pub fn rows(&self) -> &[(K, V)] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.rows.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<(K, V)> {
        self.rows
    }
}

/// Registered and casual rentals for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSplit {
    pub registered: u64,
    pub casual: u64,
}

impl UserSplit {
    pub fn total(&self) -> u64 {
        self.registered + self.casual
    }
}

/// Scalar totals shown as the dashboard's summary metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryTotals {
    pub total: u64,
    pub registered: u64,
    pub casual: u64,
}

/// Calendar month of a given year, ordered chronologically.
///
/// Displays and parses as the short label used on charts, e.g. `Jan 2021`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear {
    year: i32,
    month: u32,
}

/// Strftime pattern of month labels.
pub const MONTH_LABEL_FORMAT: &str = "%b %Y";

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day().format(MONTH_LABEL_FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError(pub String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a month label like `Jan 2021`", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

impl FromStr for MonthYear {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Anchor the label on the first day so chrono can rebuild a full date.
        NaiveDate::parse_from_str(&format!("1 {}", s.trim()), "%d %b %Y")
            .map(Self::of)
            .map_err(|_| ParseMonthError(s.to_string()))
    }
}
