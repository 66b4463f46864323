//! Aggregation Pipeline
//! Turns a dataset and a date selection into everything the dashboard draws.

use crate::data::{DateRange, DateSelection, Dataset};
use crate::error::DashboardError;
use crate::stats::aggregator::{AggregationError, Aggregator, WeatherAggregation};
use crate::stats::tables::{DerivedTable, MonthYear, SummaryTotals, UserSplit};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info_span};

/// Inputs of one render cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderInputs {
    pub selection: DateSelection,
    pub weather: WeatherAggregation,
    /// Run the independent aggregations on the rayon pool.
    pub parallel: bool,
}

/// All derived tables of one render cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedTables {
    pub daily_total: DerivedTable<NaiveDate, u64>,
    pub daily_registered: DerivedTable<NaiveDate, u64>,
    pub daily_casual: DerivedTable<NaiveDate, u64>,
    pub hourly_total: DerivedTable<u8, u64>,
    pub seasonal_split: DerivedTable<String, UserSplit>,
    pub weather: DerivedTable<String, f64>,
    pub working_day_split: DerivedTable<String, UserSplit>,
    pub monthly_trend: DerivedTable<MonthYear, u64>,
}

impl DerivedTables {
    /// Compute every table over an already filtered frame.
    pub fn compute(
        df: &DataFrame,
        weather: WeatherAggregation,
        parallel: bool,
    ) -> Result<Self, AggregationError> {
        if parallel {
            return Self::compute_parallel(df, weather);
        }

        Ok(Self {
            daily_total: Aggregator::daily_total(df)?,
            daily_registered: Aggregator::daily_registered(df)?,
            daily_casual: Aggregator::daily_casual(df)?,
            hourly_total: Aggregator::hourly_total(df)?,
            seasonal_split: Aggregator::seasonal_split(df)?,
            weather: Aggregator::weather_aggregate(df, weather)?,
            working_day_split: Aggregator::working_day_split(df)?,
            monthly_trend: Aggregator::monthly_trend(df)?,
        })
    }

    fn compute_parallel(
        df: &DataFrame,
        weather: WeatherAggregation,
    ) -> Result<Self, AggregationError> {
        let ((daily_total, daily_registered), (daily_casual, hourly_total)) = rayon::join(
            || {
                rayon::join(
                    || Aggregator::daily_total(df),
                    || Aggregator::daily_registered(df),
                )
            },
            || rayon::join(|| Aggregator::daily_casual(df), || Aggregator::hourly_total(df)),
        );
        let ((seasonal_split, weather_table), (working_day_split, monthly_trend)) = rayon::join(
            || {
                rayon::join(
                    || Aggregator::seasonal_split(df),
                    || Aggregator::weather_aggregate(df, weather),
                )
            },
            || {
                rayon::join(
                    || Aggregator::working_day_split(df),
                    || Aggregator::monthly_trend(df),
                )
            },
        );

        Ok(Self {
            daily_total: daily_total?,
            daily_registered: daily_registered?,
            daily_casual: daily_casual?,
            hourly_total: hourly_total?,
            seasonal_split: seasonal_split?,
            weather: weather_table?,
            working_day_split: working_day_split?,
            monthly_trend: monthly_trend?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.daily_total.is_empty()
            && self.daily_registered.is_empty()
            && self.daily_casual.is_empty()
            && self.hourly_total.is_empty()
            && self.seasonal_split.is_empty()
            && self.weather.is_empty()
            && self.working_day_split.is_empty()
            && self.monthly_trend.is_empty()
    }
}

/// Output of one render cycle, read by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub range: DateRange,
    pub weather_mode: WeatherAggregation,
    /// Records inside `range`.
    pub row_count: usize,
    pub totals: SummaryTotals,
    pub tables: DerivedTables,
}

/// Recompute the dashboard for `inputs`. Pure: same inputs, same output.
pub fn compute(dataset: &Dataset, inputs: &RenderInputs) -> Result<DashboardData, DashboardError> {
    let range = inputs.selection.resolve(dataset.bounds())?;
    compute_range(dataset, range, inputs.weather, inputs.parallel)
}

/// Recompute for an explicit range, without clamping it to the dataset bounds.
///
/// A range matching no records produces empty tables and zero totals.
pub fn compute_range(
    dataset: &Dataset,
    range: DateRange,
    weather: WeatherAggregation,
    parallel: bool,
) -> Result<DashboardData, DashboardError> {
    let span = info_span!("pipeline", start = %range.start(), end = %range.end());
    let _guard = span.enter();

    let filtered = dataset.filter(&range).map_err(AggregationError::from)?;
    let totals = Aggregator::summary_totals(&filtered)?;
    let tables = DerivedTables::compute(&filtered, weather, parallel)?;

    debug!(
        rows = filtered.height(),
        days = tables.daily_total.len(),
        months = tables.monthly_trend.len(),
        "derived tables ready"
    );

    Ok(DashboardData {
        range,
        weather_mode: weather,
        row_count: filtered.height(),
        totals,
        tables,
    })
}
