//! Input Validation Module
//! Optional checks on a loaded dataset. Findings are reported, never repaired.

use crate::data::loader::Dataset;
use crate::data::record::{ROW_INDEX, USER_CASUAL, USER_COUNT, USER_REGISTERED};
use polars::prelude::*;
use tracing::warn;

/// Upper bound on individual issues kept in a report.
pub const MAX_REPORTED_ISSUES: usize = 50;

/// A row whose registered and casual counts do not add up to its total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    pub row: IdxSize,
    pub user_count: u64,
    pub user_registered: u64,
    pub user_casual: u64,
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub rows_checked: usize,
    pub mismatched_rows: usize,
    /// First [`MAX_REPORTED_ISSUES`] mismatches, in row order.
    pub mismatches: Vec<CountMismatch>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatched_rows == 0
    }

    pub fn summary(&self) -> String {
        if self.is_clean() {
            format!("{} rows validated", self.rows_checked)
        } else {
            format!(
                "{} of {} rows have registered + casual != total",
                self.mismatched_rows, self.rows_checked
            )
        }
    }
}

/// Check `user_registered + user_casual == user_count` on every row.
pub fn validate(dataset: &Dataset) -> PolarsResult<ValidationReport> {
    let df = dataset.frame();
    let bad = df
        .clone()
        .lazy()
        .filter((col(USER_REGISTERED) + col(USER_CASUAL)).neq(col(USER_COUNT)))
        .collect()?;

    let rows = bad.column(ROW_INDEX)?.as_materialized_series().idx()?;
    let counts = bad.column(USER_COUNT)?.u64()?;
    let registered = bad.column(USER_REGISTERED)?.u64()?;
    let casual = bad.column(USER_CASUAL)?.u64()?;

    let mismatches: Vec<CountMismatch> = rows
        .into_iter()
        .zip(counts.into_iter())
        .zip(registered.into_iter().zip(casual.into_iter()))
        .take(MAX_REPORTED_ISSUES)
        .filter_map(|((row, count), (reg, cas))| {
            Some(CountMismatch {
                row: row?,
                user_count: count?,
                user_registered: reg?,
                user_casual: cas?,
            })
        })
        .collect();

    let report = ValidationReport {
        rows_checked: df.height(),
        mismatched_rows: bad.height(),
        mismatches,
    };
    if !report.is_clean() {
        warn!(mismatched = report.mismatched_rows, "{}", report.summary());
    }
    Ok(report)
}
