//! Usage summary (UDR) model
//!
//! Usage summaries are derived on demand from call records and never stored.

use serde::{Deserialize, Serialize};

use super::cdr::{CallDirection, Cdr};

/// Total incoming/outgoing call seconds of one subscriber over a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    /// Subscriber number the summary belongs to
    pub msisdn: String,

    /// Sum of `INCOMING` call durations in seconds
    pub incoming_seconds: i64,

    /// Sum of `OUTGOING` call durations in seconds
    pub outgoing_seconds: i64,
}

impl UsageSummary {
    /// Create a zeroed summary
    pub fn empty(msisdn: impl Into<String>) -> Self {
        Self {
            msisdn: msisdn.into(),
            incoming_seconds: 0,
            outgoing_seconds: 0,
        }
    }

    /// Add a record's duration to the bucket selected by its direction tag
    pub fn add(&mut self, cdr: &Cdr) {
        let seconds = cdr.duration_seconds();
        match cdr.direction {
            CallDirection::Outgoing => self.outgoing_seconds += seconds,
            CallDirection::Incoming => self.incoming_seconds += seconds,
        }
    }

    /// Formatted incoming total
    pub fn incoming_call(&self) -> CallDuration {
        CallDuration::from_seconds(self.incoming_seconds)
    }

    /// Formatted outgoing total
    pub fn outgoing_call(&self) -> CallDuration {
        CallDuration::from_seconds(self.outgoing_seconds)
    }
}

/// Call time total rendered as `HH:MM:SS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDuration {
    pub total_time: String,
}

impl CallDuration {
    pub fn from_seconds(total_seconds: i64) -> Self {
        Self {
            total_time: format_duration(total_seconds),
        }
    }
}

/// Format a number of seconds as zero-padded `HH:MM:SS`
///
/// Hours are not wrapped at 24. Negative input is treated as zero.
pub fn format_duration(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(59), "00:00:59");
    }

    #[test]
    fn test_format_duration_no_day_wraparound() {
        assert_eq!(format_duration(3600 * 25), "25:00:00");
        assert_eq!(format_duration(3600 * 100 + 61), "100:01:01");
    }

    #[test]
    fn test_summary_buckets_by_direction() {
        let start = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let outgoing = Cdr::new(
            CallDirection::Outgoing,
            "A",
            "B",
            start,
            start + Duration::seconds(300),
        );
        let incoming = Cdr::new(
            CallDirection::Incoming,
            "B",
            "A",
            start + Duration::hours(1),
            start + Duration::hours(1) + Duration::seconds(120),
        );

        let mut summary = UsageSummary::empty("A");
        summary.add(&outgoing);
        summary.add(&incoming);

        assert_eq!(summary.outgoing_seconds, 300);
        assert_eq!(summary.incoming_seconds, 120);
        assert_eq!(summary.outgoing_call().total_time, "00:05:00");
        assert_eq!(summary.incoming_call().total_time, "00:02:00");
    }

    #[test]
    fn test_call_duration_json_shape() {
        let json = serde_json::to_value(CallDuration::from_seconds(3661)).unwrap();
        assert_eq!(json["totalTime"], "01:01:01");
    }
}
