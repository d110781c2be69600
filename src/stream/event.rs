//! The emitted event record

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

/// One event on the primary stream.
///
/// Field order is the wire order: `eventId` then `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: u64,
    pub message: String,
}

impl Event {
    /// Build the event for `event_id`, with the message `"<label> <event_id>"`.
    pub fn new(label: &str, event_id: u64) -> Self {
        Self {
            event_id,
            message: format!("{} {}", label, event_id),
        }
    }

    /// Compact JSON plus the terminating newline.
    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self).context("Failed to serialize event")?;
        line.push('\n');
        Ok(line)
    }
}
