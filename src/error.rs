//! Crate-level error type wrapping the per-module errors.

use crate::charts::RenderError;
use crate::data::{LoaderError, RangeError};
use crate::stats::AggregationError;
use thiserror::Error;

/// Any failure between loading a file and exporting its dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
