//! The recording record: one captured call, the unit of persistence.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One captured call stored in the local ledger.
///
/// Field names are fixed by the storage/wire contract and kept camelCase so
/// ledgers written by earlier clients stay readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordingRecord {
    /// Unique identifier, generated once at creation, never reused
    pub id: String,

    /// Path to the audio payload on disk; unique across records
    pub uri: String,

    /// User-entered customer identifier, non-empty
    #[serde(rename = "customerNumber")]
    pub customer_number: String,

    /// Identifier of the recording agent, supplied by the capture context
    #[serde(rename = "agentId")]
    pub agent_id: String,

    /// Set true exactly once, after a confirmed successful upload
    #[serde(default)]
    pub uploaded: bool,

    /// ISO-8601 creation time, assigned once
    pub timestamp: String,

    /// `HH:MM:SS` label computed once from the measured duration
    pub duration: String,
}

impl RecordingRecord {
    /// Create a new record for a captured call.
    ///
    /// Rejects an empty (or whitespace-only) customer number; everything else
    /// is taken as-is from the capture context.
    pub fn new(
        uri: impl Into<String>,
        customer_number: &str,
        agent_id: impl Into<String>,
        duration_millis: u64,
    ) -> Result<Self> {
        let customer_number = customer_number.trim();
        if customer_number.is_empty() {
            bail!("Customer number must not be empty");
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            uri: uri.into(),
            customer_number: customer_number.to_string(),
            agent_id: agent_id.into(),
            uploaded: false,
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration: format_duration(duration_millis),
        })
    }
}

/// Format a duration in milliseconds as `HH:MM:SS`.
pub fn format_duration(millis: u64) -> String {
    let total_sec = millis / 1000;
    let hours = total_sec / 3600;
    let min = (total_sec % 3600) / 60;
    let sec = total_sec % 60;
    format!("{hours:02}:{min:02}:{sec:02}")
}
