//! Stats module - Usage aggregation pipeline

mod aggregator;
mod pipeline;
mod tables;

pub use aggregator::{AggregationError, Aggregator, WeatherAggregation};
pub use pipeline::{compute, compute_range, DashboardData, DerivedTables, RenderInputs};
pub use tables::{DerivedTable, MonthYear, ParseMonthError, SummaryTotals, UserSplit};
