//! CDR (Call Detail Record) model
//!
//! Represents synthesized call records. Records are append-only: they are
//! created by the generator, persisted in batches and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Call direction tag carried by every record
///
/// Persisted with the legacy call type codes `01` (outgoing) and `02`
/// (incoming).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallDirection {
    Outgoing,
    Incoming,
}

impl CallDirection {
    /// Call type code used in storage and CSV reports
    pub fn code(&self) -> &'static str {
        match self {
            CallDirection::Outgoing => "01",
            CallDirection::Incoming => "02",
        }
    }

    /// Parse a call type code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(CallDirection::Outgoing),
            "02" => Some(CallDirection::Incoming),
            _ => None,
        }
    }
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallDirection::Outgoing => write!(f, "OUTGOING"),
            CallDirection::Incoming => write!(f, "INCOMING"),
        }
    }
}

/// CDR (Call Detail Record)
///
/// Invariants: `end_time > start_time` and `caller_number != callee_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cdr {
    /// Store-assigned identifier (0 until persisted)
    pub id: i64,

    /// Direction tag, chosen independently of caller/callee
    pub direction: CallDirection,

    /// Number that placed the call
    pub caller_number: String,

    /// Number that received the call
    pub callee_number: String,

    /// Call start timestamp
    pub start_time: DateTime<Utc>,

    /// Call end timestamp
    pub end_time: DateTime<Utc>,
}

impl Cdr {
    /// Build a record that has not been persisted yet
    pub fn new(
        direction: CallDirection,
        caller_number: impl Into<String>,
        callee_number: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            direction,
            caller_number: caller_number.into(),
            callee_number: callee_number.into(),
            start_time,
            end_time,
        }
    }

    /// Call length in whole seconds
    #[inline]
    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }

    /// Check whether the subscriber took part in the call on either side
    #[inline]
    pub fn involves(&self, msisdn: &str) -> bool {
        self.caller_number == msisdn || self.callee_number == msisdn
    }

    /// Check the record invariants
    pub fn is_consistent(&self) -> bool {
        self.end_time > self.start_time && self.caller_number != self.callee_number
    }
}
