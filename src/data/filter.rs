//! Date Range Filter Module
//! Inclusive date-range selection over a loaded dataset.

use crate::data::loader::{DateBounds, Dataset};
use crate::data::record::DATE_DAY;
use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid range: start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("Invalid range: {start}..={end} lies outside the dataset ({min}..={max})")]
    OutOfBounds {
        start: NaiveDate,
        end: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },
}

/// Inclusive `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl From<DateBounds> for DateRange {
    fn from(bounds: DateBounds) -> Self {
        Self {
            start: bounds.min,
            end: bounds.max,
        }
    }
}

/// Keep the rows whose `date_day` lies in `range`, preserving row order.
///
/// Dates outside the dataset simply match nothing.
pub fn filter_range(df: &DataFrame, range: &DateRange) -> PolarsResult<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(
            col(DATE_DAY)
                .gt_eq(lit(range.start))
                .and(col(DATE_DAY).lt_eq(lit(range.end))),
        )
        .collect()?;

    debug!(
        start = %range.start,
        end = %range.end,
        rows = filtered.height(),
        "filtered date range"
    );
    Ok(filtered)
}

impl Dataset {
    /// Rows of this dataset within `range`.
    pub fn filter(&self, range: &DateRange) -> PolarsResult<DataFrame> {
        filter_range(self.frame(), range)
    }
}

/// Date selection as it comes from the presentation layer.
///
/// Unset ends default to the dataset bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateSelection {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Resolve into a concrete range clamped to `bounds`.
    pub fn resolve(&self, bounds: DateBounds) -> Result<DateRange, RangeError> {
        let start = self.start.unwrap_or(bounds.min);
        let end = self.end.unwrap_or(bounds.max);

        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        if end < bounds.min || start > bounds.max {
            return Err(RangeError::OutOfBounds {
                start,
                end,
                min: bounds.min,
                max: bounds.max,
            });
        }

        DateRange::new(start.max(bounds.min), end.min(bounds.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{EventRecord, USER_COUNT};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let records = vec![
            EventRecord::new(day(1, 3), 0, "Spring", "Clear", "Yes", 3, 0),
            EventRecord::new(day(1, 1), 0, "Spring", "Clear", "Yes", 1, 0),
            EventRecord::new(day(1, 2), 0, "Spring", "Clear", "Yes", 2, 0),
            EventRecord::new(day(1, 2), 1, "Spring", "Clear", "Yes", 20, 0),
        ];
        Dataset::from_records(&records).unwrap()
    }

    fn counts(df: &DataFrame) -> Vec<u64> {
        df.column(USER_COUNT)
            .unwrap()
            .u64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_range_rejects_reversed_bounds() {
        let err = DateRange::new(day(2, 1), day(1, 1)).unwrap_err();
        assert!(matches!(err, RangeError::StartAfterEnd { .. }));
    }

    #[test]
    fn test_filter_is_inclusive_and_ordered() {
        let ds = dataset();
        let range = DateRange::new(day(1, 2), day(1, 3)).unwrap();
        let filtered = ds.filter(&range).unwrap();
        assert_eq!(counts(&filtered), vec![2, 20, 3]);
    }

    #[test]
    fn test_single_day() {
        let ds = dataset();
        let filtered = ds.filter(&DateRange::day(day(1, 2))).unwrap();
        assert_eq!(counts(&filtered), vec![2, 20]);
    }

    #[test]
    fn test_out_of_bounds_day_is_empty() {
        let ds = dataset();
        let before = ds.filter(&DateRange::day(day(1, 1) - chrono::Duration::days(30)));
        let after = ds.filter(&DateRange::day(day(6, 1)));
        assert_eq!(before.unwrap().height(), 0);
        assert_eq!(after.unwrap().height(), 0);
    }

    #[test]
    fn test_selection_defaults_to_bounds() {
        let bounds = dataset().bounds();
        let range = DateSelection::default().resolve(bounds).unwrap();
        assert_eq!(range, DateRange::from(bounds));
    }

    #[test]
    fn test_selection_clamps_and_rejects() {
        let bounds = dataset().bounds();

        let clamped = DateSelection::new(day(1, 1) - chrono::Duration::days(5), day(1, 2))
            .resolve(bounds)
            .unwrap();
        assert_eq!(clamped.start(), day(1, 1));
        assert_eq!(clamped.end(), day(1, 2));

        let outside = DateSelection::new(day(3, 1), day(3, 2)).resolve(bounds);
        assert!(matches!(outside, Err(RangeError::OutOfBounds { .. })));

        let reversed = DateSelection::new(day(1, 3), day(1, 1)).resolve(bounds);
        assert!(matches!(reversed, Err(RangeError::StartAfterEnd { .. })));
    }
}
