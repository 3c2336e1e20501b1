//! File-backed history repository.
//!
//! Persists the whole history as one JSON document behind
//! [`AtomicJsonFile`]. The on-disk format is a versioned envelope:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "entries": [
//!     {
//!       "id": "…",
//!       "timestamp": "2026-08-29T12:00:00Z",
//!       "kind": "Forward",
//!       "inputsSummary": "D=50 Gy, n=25, α/β=10",
//!       "resultSummary": "50.00 Gy"
//!     }
//!   ]
//! }
//! ```
//!
//! The legacy apps persisted a bare top-level array; that shape is still
//! accepted on load and rewritten as a versioned envelope on the next save.
//! Anything else is treated as corruption: logged, discarded, and reported
//! as an empty load so a bad blob can never wedge startup.

use crate::paths::Eqd2Paths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use eqd2_core::error::{Eqd2Error, Result};
use eqd2_core::history::{HistoryEntry, HistoryRepository};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Current persisted-schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around the entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryBlob {
    schema_version: u32,
    entries: Vec<HistoryEntry>,
}

/// [`HistoryRepository`] over a single JSON file.
pub struct JsonHistoryRepository {
    file: Arc<AtomicJsonFile<HistoryBlob>>,
}

impl JsonHistoryRepository {
    /// Creates a repository persisting to the given file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    /// Creates a repository at the default platform location
    /// (`<config>/eqd2/calculation_history.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be resolved.
    pub fn default_location() -> Result<Self> {
        let path = Eqd2Paths::history_file()
            .map_err(|e| Eqd2Error::config(format!("Failed to resolve history path: {}", e)))?;
        Ok(Self::new(path))
    }

    /// Parses raw file contents, tolerating the legacy unversioned shape.
    ///
    /// Returns `None` for anything unparseable: corruption self-heals to
    /// an empty history rather than failing hydration.
    fn parse(content: &str) -> Option<Vec<HistoryEntry>> {
        match serde_json::from_str::<HistoryBlob>(content) {
            Ok(blob) if blob.schema_version <= SCHEMA_VERSION => Some(blob.entries),
            Ok(blob) => {
                tracing::warn!(
                    "Persisted history has unknown schema version {}, starting empty",
                    blob.schema_version
                );
                None
            }
            Err(_) => match serde_json::from_str::<Vec<HistoryEntry>>(content) {
                Ok(entries) => {
                    tracing::debug!("Loaded legacy unversioned history format");
                    Some(entries)
                }
                Err(err) => {
                    tracing::warn!("Discarding corrupt history data: {}", err);
                    None
                }
            },
        }
    }
}

#[async_trait]
impl HistoryRepository for JsonHistoryRepository {
    async fn load(&self) -> Result<Option<Vec<HistoryEntry>>> {
        let file = Arc::clone(&self.file);
        let content = tokio::task::spawn_blocking(move || file.load_raw())
            .await
            .map_err(|e| Eqd2Error::internal(format!("History load task failed: {}", e)))??;

        match content {
            Some(content) => Ok(Self::parse(&content)),
            None => Ok(None),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let blob = HistoryBlob {
            schema_version: SCHEMA_VERSION,
            entries: entries.to_vec(),
        };
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.save(&blob))
            .await
            .map_err(|e| Eqd2Error::internal(format!("History save task failed: {}", e)))?
    }

    async fn clear(&self) -> Result<()> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.delete())
            .await
            .map_err(|e| Eqd2Error::internal(format!("History clear task failed: {}", e)))?
    }
}
