//! Bike Sharing Dashboard
//!
//! Loads an hourly bike rental dataset, filters it by date range and
//! aggregates usage by day, hour, season, weather, working day and month.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod stats;

pub use config::DashboardConfig;
pub use data::{DataLoader, Dataset, DateRange, DateSelection};
pub use error::DashboardError;
pub use stats::{compute, DashboardData, RenderInputs, WeatherAggregation};
