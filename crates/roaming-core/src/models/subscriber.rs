//! Subscriber model

use serde::{Deserialize, Serialize};

/// A subscriber of the directory, identified by MSISDN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Store-assigned identifier
    pub id: i64,

    /// Phone number
    pub msisdn: String,
}

impl Subscriber {
    /// Create a subscriber that has not been persisted yet
    pub fn new(msisdn: impl Into<String>) -> Self {
        Self {
            id: 0,
            msisdn: msisdn.into(),
        }
    }
}
