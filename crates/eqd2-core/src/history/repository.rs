//! Repository trait for history persistence.

use super::entry::HistoryEntry;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence backend for the calculation history.
///
/// Writes are idempotent full-snapshot replacements, most-recent-first,
/// never deltas. Implementations live in the infrastructure crate; the
/// store only ever sees this trait.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads the persisted entries, most-recent-first.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet. Corrupt data
    /// an implementation cannot parse is *not* an error: it is discarded and
    /// reported as `Ok(None)` so a bad blob can never wedge startup.
    async fn load(&self) -> Result<Option<Vec<HistoryEntry>>>;

    /// Replaces the persisted snapshot with `entries`.
    async fn save(&self, entries: &[HistoryEntry]) -> Result<()>;

    /// Removes the persisted snapshot entirely.
    async fn clear(&self) -> Result<()>;
}
