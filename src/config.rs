//! Dashboard Configuration
//! JSON settings file with defaults for every field.

use crate::data::DEFAULT_DATE_FORMAT;
use crate::stats::WeatherAggregation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "BIKE_DASHBOARD_CONFIG";

/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Cleaned hourly dataset loaded at startup.
    pub data_path: PathBuf,
    /// Strftime format of the `date_day` column.
    pub date_format: String,
    pub weather_aggregation: WeatherAggregation,
    /// Run the independent aggregations in parallel.
    pub parallel: bool,
    /// Check registered + casual == total after loading.
    pub validate_input: bool,
    pub export_width: u32,
    pub export_height: u32,
    pub window_title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dashboard/main_data.csv"),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            weather_aggregation: WeatherAggregation::Sum,
            parallel: false,
            validate_input: false,
            export_width: 1600,
            export_height: 1200,
            window_title: "Bike Sharing Dashboard".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read a config file. Fields missing from the file keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the config from the environment variable, the default file, or defaults.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }
}
