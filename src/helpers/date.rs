//! Date helper functions

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Current calendar day in UTC
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Format a calendar day as `YYYY-MM-DD`
pub fn iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Midnight UTC of a calendar day
pub fn start_of_day_utc(date: &NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}
