//! In-memory history repository.

use async_trait::async_trait;
use eqd2_core::error::Result;
use eqd2_core::history::{HistoryEntry, HistoryRepository};
use tokio::sync::Mutex;

/// [`HistoryRepository`] that never touches disk.
///
/// For tests and ephemeral composition (e.g. a "do not remember me" mode):
/// the snapshot lives for the lifetime of the repository and is gone with
/// the process.
#[derive(Default)]
pub struct MemoryHistoryRepository {
    snapshot: Mutex<Option<Vec<HistoryEntry>>>,
}

impl MemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the repository, as if entries had been persisted earlier.
    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            snapshot: Mutex::new(Some(entries)),
        }
    }
}

#[async_trait]
impl HistoryRepository for MemoryHistoryRepository {
    async fn load(&self) -> Result<Option<Vec<HistoryEntry>>> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        *self.snapshot.lock().await = Some(entries.to_vec());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.snapshot.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqd2_core::history::ConversionKind;

    #[tokio::test]
    async fn save_load_clear() {
        let repo = MemoryHistoryRepository::new();
        assert!(repo.load().await.unwrap().is_none());

        let entries = vec![HistoryEntry::new(
            ConversionKind::Forward,
            "D=50 Gy, n=25, α/β=10",
            "50.00 Gy",
        )];
        repo.save(&entries).await.unwrap();
        assert_eq!(repo.load().await.unwrap().unwrap(), entries);

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
    }
}
