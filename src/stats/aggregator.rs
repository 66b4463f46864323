//! Usage Aggregator Module
//! Group-by summaries of rental counts over a filtered record frame.

use crate::data::{
    DATE_DAY, HOUR, SEASON, USER_CASUAL, USER_COUNT, USER_REGISTERED, WEATHER_SITUATION,
    WORKING_DAY,
};
use crate::stats::tables::{
    DerivedTable, MonthYear, SummaryTotals, UserSplit, MONTH_LABEL_FORMAT,
};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column holding the month label during the monthly trend.
const MONTH_YEAR: &str = "month_year";

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Schema mismatch: {aggregation} requires field `{field}`")]
    SchemaMismatch {
        aggregation: &'static str,
        field: String,
    },
    #[error("Invalid month label: {0}")]
    InvalidMonthLabel(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// How the weather table reduces `user_count` per weather situation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherAggregation {
    #[default]
    Sum,
    Mean,
}

impl WeatherAggregation {
    pub fn label(&self) -> &'static str {
        match self {
            WeatherAggregation::Sum => "Total",
            WeatherAggregation::Mean => "Average",
        }
    }
}

/// Stateless group-by operations. Each one is independent of the others.
pub struct Aggregator;

impl Aggregator {
    /// Fail before touching the data if any field is absent.
    fn require(
        df: &DataFrame,
        aggregation: &'static str,
        fields: &[&str],
    ) -> Result<(), AggregationError> {
        match fields.iter().find(|f| df.column(f).is_err()) {
            Some(field) => Err(AggregationError::SchemaMismatch {
                aggregation,
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Sum `fields` per distinct `key`, ascending by key.
    fn sum_by(
        df: &DataFrame,
        key: Expr,
        key_name: &str,
        fields: &[&str],
    ) -> PolarsResult<DataFrame> {
        let sums: Vec<Expr> = fields
            .iter()
            .map(|f| col(*f).sum().cast(DataType::UInt64))
            .collect();

        df.clone()
            .lazy()
            .group_by([key.alias(key_name)])
            .agg(sums)
            .sort([key_name], SortMultipleOptions::default())
            .collect()
    }

    fn u64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<u64>>> {
        Ok(df.column(name)?.u64()?.into_iter().collect())
    }

    fn string_keys(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
        Ok(df
            .column(name)?
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    fn date_keys(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<NaiveDate>>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .date()?
            .as_date_iter()
            .collect())
    }

    /// Pair keys with values, dropping rows where either side is null.
    fn pair<K, V>(keys: Vec<Option<K>>, values: Vec<Option<V>>) -> Vec<(K, V)> {
        keys.into_iter()
            .zip(values)
            .filter_map(|(k, v)| Some((k?, v?)))
            .collect()
    }

    fn daily_sum(
        df: &DataFrame,
        aggregation: &'static str,
        field: &str,
    ) -> Result<DerivedTable<NaiveDate, u64>, AggregationError> {
        Self::require(df, aggregation, &[DATE_DAY, field])?;
        let grouped = Self::sum_by(df, col(DATE_DAY), DATE_DAY, &[field])?;
        let rows = Self::pair(
            Self::date_keys(&grouped, DATE_DAY)?,
            Self::u64_values(&grouped, field)?,
        );
        Ok(DerivedTable::from_rows(rows))
    }

    /// Total rentals per day.
    pub fn daily_total(df: &DataFrame) -> Result<DerivedTable<NaiveDate, u64>, AggregationError> {
        Self::daily_sum(df, "daily total", USER_COUNT)
    }

    /// Registered rentals per day.
    pub fn daily_registered(
        df: &DataFrame,
    ) -> Result<DerivedTable<NaiveDate, u64>, AggregationError> {
        Self::daily_sum(df, "daily registered", USER_REGISTERED)
    }

    /// Casual rentals per day.
    pub fn daily_casual(df: &DataFrame) -> Result<DerivedTable<NaiveDate, u64>, AggregationError> {
        Self::daily_sum(df, "daily casual", USER_CASUAL)
    }

    /// Total rentals per hour of day.
    pub fn hourly_total(df: &DataFrame) -> Result<DerivedTable<u8, u64>, AggregationError> {
        Self::require(df, "hourly total", &[HOUR, USER_COUNT])?;
        let grouped = Self::sum_by(df, col(HOUR).cast(DataType::UInt8), HOUR, &[USER_COUNT])?;

        let hours: Vec<Option<u8>> = grouped
            .column(HOUR)?
            .as_materialized_series()
            .u8()?
            .into_iter()
            .collect();
        let rows = Self::pair(hours, Self::u64_values(&grouped, USER_COUNT)?);
        Ok(DerivedTable::from_rows(rows))
    }

    fn split_by(
        df: &DataFrame,
        aggregation: &'static str,
        key: &str,
    ) -> Result<DerivedTable<String, UserSplit>, AggregationError> {
        Self::require(df, aggregation, &[key, USER_REGISTERED, USER_CASUAL])?;
        let grouped = Self::sum_by(
            df,
            col(key).cast(DataType::String),
            key,
            &[USER_REGISTERED, USER_CASUAL],
        )?;

        let splits: Vec<Option<UserSplit>> = Self::u64_values(&grouped, USER_REGISTERED)?
            .into_iter()
            .zip(Self::u64_values(&grouped, USER_CASUAL)?)
            .map(|(registered, casual)| {
                Some(UserSplit {
                    registered: registered?,
                    casual: casual?,
                })
            })
            .collect();
        let rows = Self::pair(Self::string_keys(&grouped, key)?, splits);
        Ok(DerivedTable::from_rows(rows))
    }

    /// Registered and casual rentals per season.
    pub fn seasonal_split(
        df: &DataFrame,
    ) -> Result<DerivedTable<String, UserSplit>, AggregationError> {
        Self::split_by(df, "seasonal split", SEASON)
    }

    /// Registered and casual rentals per working-day status.
    pub fn working_day_split(
        df: &DataFrame,
    ) -> Result<DerivedTable<String, UserSplit>, AggregationError> {
        Self::split_by(df, "working-day split", WORKING_DAY)
    }

    /// Rentals per weather situation, summed or averaged per hourly bucket.
    pub fn weather_aggregate(
        df: &DataFrame,
        mode: WeatherAggregation,
    ) -> Result<DerivedTable<String, f64>, AggregationError> {
        Self::require(df, "weather aggregate", &[WEATHER_SITUATION, USER_COUNT])?;

        let reduce = match mode {
            WeatherAggregation::Sum => col(USER_COUNT).sum(),
            WeatherAggregation::Mean => col(USER_COUNT).mean(),
        };
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(WEATHER_SITUATION).cast(DataType::String)])
            .agg([reduce.cast(DataType::Float64)])
            .sort([WEATHER_SITUATION], SortMultipleOptions::default())
            .collect()?;

        let values: Vec<Option<f64>> = grouped.column(USER_COUNT)?.f64()?.into_iter().collect();
        let rows = Self::pair(Self::string_keys(&grouped, WEATHER_SITUATION)?, values);
        Ok(DerivedTable::from_rows(rows))
    }

    /// Total rentals per calendar month, in chronological order.
    ///
    /// Grouping happens on the `Jan 2021` style label; rows are then reordered
    /// by the month each label denotes, since lexical label order is wrong.
    pub fn monthly_trend(df: &DataFrame) -> Result<DerivedTable<MonthYear, u64>, AggregationError> {
        Self::require(df, "monthly trend", &[DATE_DAY, USER_COUNT])?;
        let grouped = Self::sum_by(
            df,
            col(DATE_DAY).dt().strftime(MONTH_LABEL_FORMAT),
            MONTH_YEAR,
            &[USER_COUNT],
        )?;

        let mut rows = Vec::with_capacity(grouped.height());
        for (label, total) in Self::pair(
            Self::string_keys(&grouped, MONTH_YEAR)?,
            Self::u64_values(&grouped, USER_COUNT)?,
        ) {
            let month = label
                .parse::<MonthYear>()
                .map_err(|e| AggregationError::InvalidMonthLabel(e.to_string()))?;
            rows.push((month, total));
        }
        rows.sort_by_key(|(month, _)| *month);

        Ok(DerivedTable::from_rows(rows))
    }

    /// Sums of the three count columns; zero for an empty frame.
    pub fn summary_totals(df: &DataFrame) -> Result<SummaryTotals, AggregationError> {
        Self::require(df, "summary totals", &[USER_COUNT, USER_REGISTERED, USER_CASUAL])?;
        let sums = df
            .clone()
            .lazy()
            .select([
                col(USER_COUNT).sum().cast(DataType::UInt64),
                col(USER_REGISTERED).sum().cast(DataType::UInt64),
                col(USER_CASUAL).sum().cast(DataType::UInt64),
            ])
            .collect()?;

        let first = |name: &str| -> PolarsResult<u64> {
            Ok(sums.column(name)?.u64()?.get(0).unwrap_or(0))
        };
        Ok(SummaryTotals {
            total: first(USER_COUNT)?,
            registered: first(USER_REGISTERED)?,
            casual: first(USER_CASUAL)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{records_to_frame, EventRecord};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> DataFrame {
        records_to_frame(&[
            EventRecord::new(day(2021, 11, 3), 8, "Fall", "Clear", "Yes", 30, 5),
            EventRecord::new(day(2021, 11, 3), 17, "Fall", "Mist", "Yes", 50, 10),
            EventRecord::new(day(2021, 12, 25), 8, "Winter", "Clear", "No", 4, 6),
            EventRecord::new(day(2022, 1, 2), 12, "Winter", "Light Snow", "No", 2, 8),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_record_scenario() {
        let df = records_to_frame(&[EventRecord::new(
            day(2021, 1, 1),
            5,
            "spring",
            "clear",
            "true",
            7,
            3,
        )])
        .unwrap();

        let daily = Aggregator::daily_total(&df).unwrap();
        assert_eq!(daily.rows(), &[(day(2021, 1, 1), 10)]);

        let hourly = Aggregator::hourly_total(&df).unwrap();
        assert_eq!(hourly.rows(), &[(5, 10)]);

        let seasons = Aggregator::seasonal_split(&df).unwrap();
        assert_eq!(
            seasons.rows(),
            &[(
                "spring".to_string(),
                UserSplit {
                    registered: 7,
                    casual: 3
                }
            )]
        );
    }

    #[test]
    fn test_daily_tables() {
        let df = sample();
        let total = Aggregator::daily_total(&df).unwrap();
        let registered = Aggregator::daily_registered(&df).unwrap();
        let casual = Aggregator::daily_casual(&df).unwrap();

        assert_eq!(
            total.rows(),
            &[
                (day(2021, 11, 3), 95),
                (day(2021, 12, 25), 10),
                (day(2022, 1, 2), 10)
            ]
        );
        assert_eq!(registered.get(&day(2021, 11, 3)), Some(&80));
        assert_eq!(casual.get(&day(2021, 11, 3)), Some(&15));
    }

    #[test]
    fn test_hourly_total_groups_hours() {
        let hourly = Aggregator::hourly_total(&sample()).unwrap();
        assert_eq!(hourly.rows(), &[(8, 45), (12, 10), (17, 60)]);
    }

    #[test]
    fn test_working_day_split() {
        let split = Aggregator::working_day_split(&sample()).unwrap();
        assert_eq!(
            split.get(&"No".to_string()),
            Some(&UserSplit {
                registered: 6,
                casual: 14
            })
        );
        assert_eq!(split.get(&"Yes".to_string()).map(UserSplit::total), Some(95));
    }

    #[test]
    fn test_weather_sum_and_mean() {
        let df = sample();
        let sum = Aggregator::weather_aggregate(&df, WeatherAggregation::Sum).unwrap();
        let mean = Aggregator::weather_aggregate(&df, WeatherAggregation::Mean).unwrap();

        assert_eq!(sum.get(&"Clear".to_string()), Some(&45.0));
        assert_eq!(mean.get(&"Clear".to_string()), Some(&22.5));
        assert_eq!(sum.len(), 3);
        assert_eq!(mean.len(), 3);
    }

    #[test]
    fn test_monthly_trend_is_chronological() {
        let monthly = Aggregator::monthly_trend(&sample()).unwrap();
        let labels: Vec<String> = monthly.keys().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["Nov 2021", "Dec 2021", "Jan 2022"]);
        assert_eq!(monthly.values().copied().collect::<Vec<_>>(), vec![95, 10, 10]);
    }

    #[test]
    fn test_empty_frame_yields_empty_tables() {
        let df = records_to_frame(&[]).unwrap();
        assert!(Aggregator::daily_total(&df).unwrap().is_empty());
        assert!(Aggregator::hourly_total(&df).unwrap().is_empty());
        assert!(Aggregator::seasonal_split(&df).unwrap().is_empty());
        assert!(Aggregator::weather_aggregate(&df, WeatherAggregation::Mean)
            .unwrap()
            .is_empty());
        assert!(Aggregator::monthly_trend(&df).unwrap().is_empty());
        assert_eq!(Aggregator::summary_totals(&df).unwrap(), SummaryTotals::default());
    }

    #[test]
    fn test_missing_field_is_schema_mismatch() {
        let df = sample().drop(SEASON).unwrap();
        let err = Aggregator::seasonal_split(&df).unwrap_err();
        assert!(matches!(
            err,
            AggregationError::SchemaMismatch { field, .. } if field == SEASON
        ));
        assert!(Aggregator::daily_total(&df).is_ok());
    }

    #[test]
    fn test_summary_totals() {
        let totals = Aggregator::summary_totals(&sample()).unwrap();
        assert_eq!(
            totals,
            SummaryTotals {
                total: 115,
                registered: 86,
                casual: 29
            }
        );
    }
}
