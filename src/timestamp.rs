//! Parsing and storage helpers for timestamps.
//!
//! Timestamps are stored in the database as milliseconds since the Unix epoch
//! so that date range filters can be done with plain integer comparisons.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, error::ComponentRange,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// Parse a timestamp from an RFC 3339 string (e.g. "2024-01-31T09:30:00Z"),
/// a date and time without an offset (e.g. "2024-01-31T09:30") or a calendar
/// date (e.g. "2024-01-31").
///
/// Timestamps without an offset are interpreted as UTC, and calendar dates as
/// midnight UTC.
pub fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timestamp);
    }

    if let Ok(timestamp) = PrimitiveDateTime::parse(
        text,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
        ),
    ) {
        return Some(timestamp.assume_utc());
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Convert a timestamp to whole milliseconds since the Unix epoch.
pub fn to_millis(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Convert milliseconds since the Unix epoch to a UTC timestamp.
///
/// # Errors
/// Returns an error if `millis` is outside of the range supported by [OffsetDateTime].
pub fn from_millis(millis: i64) -> Result<OffsetDateTime, ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
}

/// The current time truncated to millisecond precision, the precision used for storage.
pub fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    from_millis(to_millis(now)).unwrap_or(now)
}
