//! Time windows and the month/timestamp formats accepted by the service
//!
//! Months use the literal `yyyy-MM` format; full timestamps use
//! `yyyy-MM-dd'T'HH:mm:ss`. All times are interpreted as UTC.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::AppResult;

/// Full timestamp format (`yyyy-MM-dd'T'HH:mm:ss`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Human readable month format used in error messages
pub const MONTH_FORMAT: &str = "yyyy-MM";

/// Half-open time range `[start, end)` over call start times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window of `months` calendar months ending at `end`
    pub fn months_ending_at(end: DateTime<Utc>, months: u32) -> Self {
        let start = end
            .checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end }
    }

    /// One year ending at `now`
    pub fn last_year(now: DateTime<Utc>) -> Self {
        Self::months_ending_at(now, 12)
    }

    /// Whole calendar month given as `yyyy-MM`
    pub fn for_month(month: &str) -> AppResult<Self> {
        let first = parse_month(month)?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| invalid_month(month))?;

        Ok(Self {
            start: midnight_utc(first)?,
            end: midnight_utc(next)?,
        })
    }

    /// Check whether a timestamp falls inside the window
    #[inline]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// True when the window holds no instant
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Parse a `yyyy-MM` month into the first day of that month
///
/// The format is strict: four digit year, dash, two digit month.
pub fn parse_month(month: &str) -> AppResult<NaiveDate> {
    let bytes = month.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit());

    if !well_formed {
        return Err(invalid_month(month));
    }

    let year: i32 = month[..4].parse().map_err(|_| invalid_month(month))?;
    let month_num: u32 = month[5..].parse().map_err(|_| invalid_month(month))?;

    NaiveDate::from_ymd_opt(year, month_num, 1).ok_or_else(|| invalid_month(month))
}

/// Parse a `yyyy-MM-dd'T'HH:mm:ss` timestamp as UTC
///
/// Only the exact 19 character shape with a four digit year is accepted.
pub fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(invalid_timestamp(value));
    }

    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|_| invalid_timestamp(value))?;

    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Render a timestamp in the `yyyy-MM-dd'T'HH:mm:ss` format
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

fn midnight_utc(date: NaiveDate) -> AppResult<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Internal(format!("Invalid midnight for {}", date)))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn invalid_timestamp(value: &str) -> AppError {
    AppError::Validation(format!(
        "Invalid timestamp '{}'. Use yyyy-MM-dd'T'HH:mm:ss",
        value
    ))
}

fn invalid_month(month: &str) -> AppError {
    AppError::Validation(format!(
        "Invalid month '{}'. Use {}",
        month, MONTH_FORMAT
    ))
}
