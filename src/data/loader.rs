//! CSV Data Loader Module
//! Loads the bike sharing table with Polars and puts it in chronological order.

use crate::data::record::{
    records_to_frame, EventRecord, CATEGORY_COLUMNS, COUNT_COLUMNS, DATE_DAY, HOUR,
    REQUIRED_COLUMNS, ROW_INDEX,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default `date_day` format of the cleaned dataset.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Failed to parse column `{column}`: {reason}")]
    ParseError { column: String, reason: String },
}

impl LoaderError {
    fn parse(column: &str, reason: impl ToString) -> Self {
        LoaderError::ParseError {
            column: column.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Earliest and latest `date_day` present in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    /// Number of calendar days covered, both ends included.
    pub fn span_days(&self) -> i64 {
        (self.max - self.min).num_days() + 1
    }
}

/// Immutable, chronologically ordered record set.
///
/// Cloning is cheap: the frame's columns are reference counted.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    bounds: DateBounds,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Build a dataset from typed records, applying the same ordering as a CSV load.
    pub fn from_records(records: &[EventRecord]) -> Result<Self, LoaderError> {
        let df = records_to_frame(records)
            .map_err(|e| LoaderError::DataUnavailable(e.to_string()))?;
        DataLoader::canonicalize(df, DEFAULT_DATE_FORMAT)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn bounds(&self) -> DateBounds {
        self.bounds
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }
}

/// Loads CSV files into [`Dataset`]s.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    ///
    /// Either the whole file loads or an error is returned; nothing partial.
    pub fn load_csv(path: impl AsRef<Path>, date_format: &str) -> Result<Dataset, LoaderError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading dataset");

        // Every column is read as text; typing happens in `canonicalize`.
        let raw = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_rechunk(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| {
                LoaderError::DataUnavailable(format!("{}: {}", path.display(), e))
            })?;

        let mut dataset = Self::canonicalize(raw, date_format)?;
        dataset.source = Some(path.to_path_buf());

        info!(
            rows = dataset.row_count(),
            min = %dataset.bounds.min,
            max = %dataset.bounds.max,
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse, type and order a raw frame.
    ///
    /// Output keeps only the required columns plus a fresh positional index.
    pub fn canonicalize(raw: DataFrame, date_format: &str) -> Result<Dataset, LoaderError> {
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| raw.column(name).is_err())
        {
            return Err(LoaderError::DataUnavailable(format!(
                "required field `{}` is missing",
                missing
            )));
        }
        if raw.height() == 0 {
            return Err(LoaderError::DataUnavailable(
                "dataset contains no records".to_string(),
            ));
        }

        let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for (name, expr) in Self::typed_columns(&raw, date_format) {
            let typed = raw
                .clone()
                .lazy()
                .select([expr])
                .collect()
                .map_err(|e| LoaderError::parse(name, e))?;
            let column = typed
                .column(name)
                .map_err(|e| LoaderError::parse(name, e))?;
            if column.null_count() > 0 {
                return Err(LoaderError::parse(
                    name,
                    format!("{} value(s) missing or unparseable", column.null_count()),
                ));
            }
            columns.push(column.clone());
        }

        let max_hour = columns
            .iter()
            .find(|c| c.name().as_str() == HOUR)
            .map(|c| c.as_materialized_series().u8().map(|ca| ca.max()))
            .transpose()
            .map_err(|e| LoaderError::parse(HOUR, e))?
            .flatten();
        if let Some(hour) = max_hour.filter(|h| *h > 23) {
            return Err(LoaderError::parse(
                HOUR,
                format!("{} is not an hour of the day", hour),
            ));
        }

        // Stable sort so rows sharing a date keep their file order.
        let df = DataFrame::new(columns)
            .and_then(|df| {
                df.lazy()
                    .sort(
                        [DATE_DAY],
                        SortMultipleOptions::default().with_maintain_order(true),
                    )
                    .with_row_index(ROW_INDEX, None)
                    .collect()
            })
            .map_err(|e| LoaderError::DataUnavailable(e.to_string()))?;

        let bounds = Self::date_bounds(&df)?;
        debug!(rows = df.height(), "canonicalized frame");

        Ok(Dataset {
            df,
            bounds,
            source: None,
        })
    }

    /// Casting expression for every required column, in canonical order.
    fn typed_columns(raw: &DataFrame, date_format: &str) -> Vec<(&'static str, Expr)> {
        let date_expr = match raw.column(DATE_DAY).map(|c| c.dtype()) {
            Ok(DataType::Date) => col(DATE_DAY),
            _ => col(DATE_DAY)
                .cast(DataType::String)
                .str()
                .to_date(StrptimeOptions {
                    format: Some(date_format.into()),
                    strict: false,
                    exact: true,
                    cache: true,
                }),
        };

        // Unparseable values cast to null and are rejected by the null check.
        let mut typed = vec![
            (DATE_DAY, date_expr),
            (HOUR, col(HOUR).cast(DataType::UInt8)),
        ];
        typed.extend(
            CATEGORY_COLUMNS
                .iter()
                .map(|name| (*name, col(*name).cast(DataType::String))),
        );
        typed.extend(
            COUNT_COLUMNS
                .iter()
                .map(|name| (*name, col(*name).cast(DataType::UInt64))),
        );
        typed
    }

    /// Bounds of a frame already sorted by `date_day`.
    fn date_bounds(df: &DataFrame) -> Result<DateBounds, LoaderError> {
        let column = df
            .column(DATE_DAY)
            .map_err(|e| LoaderError::parse(DATE_DAY, e))?;
        let dates = column
            .as_materialized_series()
            .date()
            .map_err(|e| LoaderError::parse(DATE_DAY, e))?;

        let mut iter = dates.as_date_iter().flatten();
        let min = iter
            .next()
            .ok_or_else(|| LoaderError::DataUnavailable("dataset contains no records".into()))?;
        let max = iter.last().unwrap_or(min);

        Ok(DateBounds { min, max })
    }
}
