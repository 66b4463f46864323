//! Event Record Module
//! Column names of the bike sharing table and a typed row for building frames.

use chrono::NaiveDate;
use polars::prelude::*;

pub const DATE_DAY: &str = "date_day";
pub const HOUR: &str = "hour";
pub const SEASON: &str = "season";
pub const WEATHER_SITUATION: &str = "weather_situation";
pub const WORKING_DAY: &str = "working_day";
pub const USER_COUNT: &str = "user_count";
pub const USER_REGISTERED: &str = "user_registered";
pub const USER_CASUAL: &str = "user_casual";

/// Positional index re-derived after the chronological sort.
pub const ROW_INDEX: &str = "index";

/// Every column the loader requires, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    DATE_DAY,
    HOUR,
    SEASON,
    WEATHER_SITUATION,
    WORKING_DAY,
    USER_COUNT,
    USER_REGISTERED,
    USER_CASUAL,
];

/// Categorical columns, kept as their textual labels.
pub const CATEGORY_COLUMNS: [&str; 3] = [SEASON, WEATHER_SITUATION, WORKING_DAY];

/// Rental count columns.
pub const COUNT_COLUMNS: [&str; 3] = [USER_COUNT, USER_REGISTERED, USER_CASUAL];

/// One hourly bucket of rental activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub date_day: NaiveDate,
    pub hour: u8,
    pub season: String,
    pub weather_situation: String,
    pub working_day: String,
    pub user_count: u64,
    pub user_registered: u64,
    pub user_casual: u64,
}

impl EventRecord {
    /// Build a record whose total is derived from the two user partitions.
    pub fn new(
        date_day: NaiveDate,
        hour: u8,
        season: &str,
        weather_situation: &str,
        working_day: &str,
        user_registered: u64,
        user_casual: u64,
    ) -> Self {
        Self {
            date_day,
            hour,
            season: season.to_string(),
            weather_situation: weather_situation.to_string(),
            working_day: working_day.to_string(),
            user_count: user_registered + user_casual,
            user_registered,
            user_casual,
        }
    }
}

/// Convert typed records into a frame with the canonical column dtypes.
///
/// Rows keep their slice order; sorting is the loader's job.
pub fn records_to_frame(records: &[EventRecord]) -> PolarsResult<DataFrame> {
    let dates: Vec<NaiveDate> = records.iter().map(|r| r.date_day).collect();
    let hours: Vec<u8> = records.iter().map(|r| r.hour).collect();
    let seasons: Vec<&str> = records.iter().map(|r| r.season.as_str()).collect();
    let weather: Vec<&str> = records
        .iter()
        .map(|r| r.weather_situation.as_str())
        .collect();
    let working: Vec<&str> = records.iter().map(|r| r.working_day.as_str()).collect();
    let counts: Vec<u64> = records.iter().map(|r| r.user_count).collect();
    let registered: Vec<u64> = records.iter().map(|r| r.user_registered).collect();
    let casual: Vec<u64> = records.iter().map(|r| r.user_casual).collect();

    DataFrame::new(vec![
        Column::new(DATE_DAY.into(), dates),
        Column::new(HOUR.into(), hours),
        Column::new(SEASON.into(), seasons),
        Column::new(WEATHER_SITUATION.into(), weather),
        Column::new(WORKING_DAY.into(), working),
        Column::new(USER_COUNT.into(), counts),
        Column::new(USER_REGISTERED.into(), registered),
        Column::new(USER_CASUAL.into(), casual),
    ])
}
