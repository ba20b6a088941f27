use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::availability::Availability;

/// The one record persisted between invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonitorState {
    #[serde(default)]
    pub last_status: Availability,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Error reported by the latest probe, if it failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Keys written by other tools are carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MonitorState {
    /// Next state after a completed probe. Unknown keys are kept.
    pub fn advance(&self, status: Availability, seen_at: DateTime<Utc>, error: Option<String>) -> Self {
        Self {
            last_status: status,
            last_seen_at: Some(seen_at),
            last_error: error,
            extra: self.extra.clone(),
        }
    }
}
