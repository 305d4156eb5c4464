//! Usage (UDR) DTOs

use roaming_core::models::{CallDuration, UsageSummary};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for a single subscriber's usage
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MonthParams {
    /// Month in `yyyy-MM` format; the last year when absent
    #[validate(length(equal = 7, message = "month must use the yyyy-MM format"))]
    pub month: Option<String>,
}

/// Query parameters for the usage of every subscriber
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AllUsageParams {
    /// Month in `yyyy-MM` format
    #[validate(length(equal = 7, message = "month must use the yyyy-MM format"))]
    pub month: String,
}

/// Usage report of one subscriber
///
/// Keeps the field names existing clients read, including `outcomingCall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub msisdn: String,
    pub incoming_call: CallDuration,
    #[serde(rename = "outcomingCall")]
    pub outgoing_call: CallDuration,
    pub incoming_seconds: i64,
    pub outgoing_seconds: i64,
}

impl From<UsageSummary> for UsageResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            incoming_call: summary.incoming_call(),
            outgoing_call: summary.outgoing_call(),
            incoming_seconds: summary.incoming_seconds,
            outgoing_seconds: summary.outgoing_seconds,
            msisdn: summary.msisdn,
        }
    }
}
