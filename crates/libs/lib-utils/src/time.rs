//! # Time Utilities
//!
//! Utilities for series dates using chrono. Trends series carry calendar
//! dates in `YYYY-MM-DD` form.

use chrono::{DateTime, NaiveDate, Utc};

/// Date format used on the trends wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a `YYYY-MM-DD` series date.
pub fn parse_date(moment: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(moment.trim(), DATE_FORMAT)
        .map_err(|_| Error::FailToDateParse(moment.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    FailToDateParse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error
