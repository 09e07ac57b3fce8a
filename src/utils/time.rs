//! Date parsing shared by sorting, SLA arithmetic and the create forms.

use jiff::Timestamp;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;

use crate::error::{PsaError, Result};

/// Wire format the project service expects for task and project dates.
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a service timestamp into an instant.
///
/// Values carrying an offset (`2024-05-10T14:30:00Z`, `...+02:00`) are exact.
/// Naive datetimes and bare dates are read as wall-clock time in `tz`.
pub fn parse_instant(raw: &str, tz: &TimeZone) -> Result<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Ok(ts);
    }

    let civil = if let Ok(dt) = raw.parse::<DateTime>() {
        dt
    } else if let Ok(date) = raw.parse::<Date>() {
        date.to_datetime(Time::midnight())
    } else {
        return Err(PsaError::InvalidDate(
            raw.to_string(),
            "expected an ISO-8601 date or datetime".to_string(),
        ));
    };

    civil
        .to_zoned(tz.clone())
        .map(|zoned| zoned.timestamp())
        .map_err(|e| PsaError::InvalidDate(raw.to_string(), e.to_string()))
}

/// Millisecond key used by date columns. Unparsable values yield `None`,
/// which sorts before every real date.
pub fn sort_millis(raw: &str) -> Option<i64> {
    parse_instant(raw, &TimeZone::system())
        .ok()
        .map(|ts| ts.as_millisecond())
}

/// Normalize user input (`YYYY/MM/DD`, `YYYY-MM-DD` or an ISO datetime) to
/// the `YYYY-MM-DDTHH:mm:ss` form the project service stores.
pub fn format_api_datetime(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let normalized = trimmed.replace('/', "-");

    let civil = if let Ok(dt) = normalized.parse::<DateTime>() {
        dt
    } else if let Ok(date) = normalized.parse::<Date>() {
        date.to_datetime(Time::midnight())
    } else if let Ok(ts) = normalized.parse::<Timestamp>() {
        ts.to_zoned(TimeZone::UTC).datetime()
    } else {
        return Err(PsaError::InvalidDate(
            trimmed.to_string(),
            "expected YYYY/MM/DD, YYYY-MM-DD or an ISO datetime".to_string(),
        ));
    };

    Ok(civil.strftime(API_DATETIME_FORMAT).to_string())
}
