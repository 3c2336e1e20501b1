//! History entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which direction produced a history entry.
///
/// Serialized as `"Forward"` / `"Reverse"` to match the persisted wire
/// format of the legacy apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionKind {
    Forward,
    Reverse,
}

/// One recorded conversion.
///
/// Entries are immutable once created: the store only inserts or removes
/// whole entries, never edits one. The summaries are human-readable
/// snapshots of the inputs and result at calculation time; the numeric
/// regimen itself is not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ConversionKind,
    pub inputs_summary: String,
    pub result_summary: String,
}

impl HistoryEntry {
    /// Creates an entry with a fresh id and the current instant.
    pub fn new(
        kind: ConversionKind,
        inputs_summary: impl Into<String>,
        result_summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            inputs_summary: inputs_summary.into(),
            result_summary: result_summary.into(),
        }
    }
}
