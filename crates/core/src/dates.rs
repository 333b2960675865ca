//! Calendar-day bucketing.
//!
//! A todo's `date` is a calendar date, not an instant. It is stored as UTC
//! midnight of that date, and "today" is the half-open UTC range
//! `[midnight, next midnight)` of the caller's calendar date. Every
//! conversion goes through the calendar date string so the server's local
//! offset never shifts a todo into a neighbouring day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open UTC range covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    /// UTC midnight of the day (inclusive).
    pub start: Timestamp,
    /// UTC midnight of the following day (exclusive).
    pub end: Timestamp,
}

impl DayRange {
    /// The calendar date this range covers.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn contains(&self, instant: &Timestamp) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, CoreError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_formed {
        return Err(CoreError::Validation(format!(
            "Invalid date '{input}', expected YYYY-MM-DD"
        )));
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| CoreError::Validation(format!("Invalid calendar date '{input}'")))
}

/// UTC range for an already-parsed calendar date.
pub fn day_range_for(date: NaiveDate) -> Result<DayRange, CoreError> {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| CoreError::Validation(format!("Date {date} is out of range")))?;
    Ok(DayRange { start, end })
}

/// UTC range for a `YYYY-MM-DD` calendar date string.
///
/// ```
/// use dayplan_core::dates::day_range;
/// let range = day_range("2024-03-01").unwrap();
/// assert_eq!(range.start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
/// assert_eq!(range.end.to_rfc3339(), "2024-03-02T00:00:00+00:00");
/// ```
pub fn day_range(date: &str) -> Result<DayRange, CoreError> {
    day_range_for(parse_calendar_date(date)?)
}

/// The caller's current calendar date, read from the local clock.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Range for an explicit date when given, otherwise for the local date now.
pub fn resolve_day(date: Option<&str>) -> Result<DayRange, CoreError> {
    match date {
        Some(date) => day_range(date),
        None => day_range_for(local_today()),
    }
}

/// Normalize a client-supplied `date` field to UTC midnight.
///
/// `YYYY-MM-DD` is the canonical form. An RFC 3339 timestamp is accepted as
/// a fallback and truncated to its UTC calendar date.
pub fn normalize_date_input(input: &str) -> Result<Timestamp, CoreError> {
    let input = input.trim();
    if let Ok(date) = parse_calendar_date(input) {
        return Ok(day_range_for(date)?.start);
    }

    let instant = DateTime::parse_from_rfc3339(input).map_err(|_| {
        CoreError::Validation(format!(
            "Invalid date '{input}', expected YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })?;
    Ok(day_range_for(instant.with_timezone(&Utc).date_naive())?.start)
}

/// Calendar date a stored todo `date` belongs to.
pub fn bucket_of(date: &Timestamp) -> NaiveDate {
    date.date_naive()
}
