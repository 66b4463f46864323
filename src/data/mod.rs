//! Data module - CSV loading, date filtering and validation

mod filter;
mod loader;
mod record;
mod validator;

pub use filter::{filter_range, DateRange, DateSelection, RangeError};
pub use loader::{DataLoader, Dataset, DateBounds, LoaderError, DEFAULT_DATE_FORMAT};
pub use record::{
    records_to_frame, EventRecord, DATE_DAY, HOUR, REQUIRED_COLUMNS, ROW_INDEX, SEASON,
    USER_CASUAL, USER_COUNT, USER_REGISTERED, WEATHER_SITUATION, WORKING_DAY,
};
pub use validator::{validate, CountMismatch, ValidationReport};
