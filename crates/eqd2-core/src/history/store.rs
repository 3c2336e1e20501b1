//! Bounded, persisted calculation-history store.

use super::entry::{ConversionKind, HistoryEntry};
use super::repository::HistoryRepository;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Maximum number of retained entries.
pub const MAX_ENTRIES: usize = 100;

/// Store tuning knobs.
///
/// `write_debounce` is the store-level write-coalescing window. It is
/// deliberately independent of any input-settling delay a UI applies before
/// calling [`HistoryStore::add_entry`]; those are two different timers.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Entry cap; oldest entries beyond it are evicted.
    pub max_entries: usize,
    /// Quiet period before a mutation's snapshot is written out.
    pub write_debounce: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_ENTRIES,
            write_debounce: Duration::from_millis(300),
        }
    }
}

/// Entries plus the debounce handle, guarded together so a mutation and its
/// write (re)scheduling form one critical section.
///
/// `generation` counts mutations. A debounced write remembers the generation
/// it was scheduled for and persists only while that is still the current
/// one, so a write that was superseded (by a newer mutation or by
/// `clear_all`) never lands.
struct StoreInner {
    entries: Vec<HistoryEntry>,
    pending_write: Option<JoinHandle<()>>,
    generation: u64,
}

fn lock_shared(shared: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    // A panicked mutation cannot leave entries half-updated (all edits are
    // single Vec operations), so a poisoned lock is still usable.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory history with debounced persistence.
///
/// One instance per running session, created at the composition root with an
/// injected repository and handed to consumers as `Arc<HistoryStore>`.
/// Construction spawns asynchronous hydration from the repository, so
/// startup never blocks on storage; [`HistoryStore::subscribe_hydrated`]
/// signals completion.
///
/// Mutations update the in-memory view synchronously, then schedule a write
/// of the current snapshot after a quiet period. A new mutation replaces any
/// pending write, so a burst of edits collapses into a single write of the
/// latest snapshot. `clear_all` is the exception: a user-intentional
/// destructive action persists immediately.
///
/// Persistence failures are logged and dropped; the in-memory view stays
/// authoritative for the rest of the session and the next mutation rewrites
/// the full snapshot anyway.
pub struct HistoryStore {
    inner: Arc<Mutex<StoreInner>>,
    /// Serializes repository writes against `clear_all`, so a write that is
    /// already past its debounce cannot land after a clear.
    write_gate: Arc<AsyncMutex<()>>,
    repository: Arc<dyn HistoryRepository>,
    config: HistoryConfig,
    hydrated_tx: watch::Sender<bool>,
    hydrated_rx: watch::Receiver<bool>,
}

impl HistoryStore {
    /// Creates the store and kicks off hydration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(repository: Arc<dyn HistoryRepository>, config: HistoryConfig) -> Arc<Self> {
        let (hydrated_tx, hydrated_rx) = watch::channel(false);

        let store = Arc::new(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                entries: Vec::new(),
                pending_write: None,
                generation: 0,
            })),
            write_gate: Arc::new(AsyncMutex::new(())),
            repository,
            config,
            hydrated_tx,
            hydrated_rx,
        });

        let hydrating = Arc::clone(&store);
        tokio::spawn(async move {
            hydrating.hydrate().await;
        });

        store
    }

    /// Creates the store with default configuration.
    pub fn with_defaults(repository: Arc<dyn HistoryRepository>) -> Arc<Self> {
        Self::new(repository, HistoryConfig::default())
    }

    fn lock_inner(&self) -> MutexGuard<'_, StoreInner> {
        lock_shared(&self.inner)
    }

    /// Snapshot of the entries, most-recent-first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock_inner().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock_inner().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_inner().entries.is_empty()
    }

    /// Whether hydration has completed (successfully or by falling back to
    /// an empty list).
    pub fn hydrated(&self) -> bool {
        *self.hydrated_rx.borrow()
    }

    /// Watch receiver that flips to `true` once hydration completes.
    pub fn subscribe_hydrated(&self) -> watch::Receiver<bool> {
        self.hydrated_rx.clone()
    }

    /// Waits until hydration has completed.
    pub async fn wait_hydrated(&self) {
        let mut rx = self.hydrated_rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Records a conversion at the front of the history.
    ///
    /// Assigns a fresh id and timestamp, evicts the oldest entries beyond
    /// the cap, and schedules a debounced write. Never blocks on I/O.
    pub fn add_entry(
        &self,
        kind: ConversionKind,
        inputs_summary: impl Into<String>,
        result_summary: impl Into<String>,
    ) {
        let entry = HistoryEntry::new(kind, inputs_summary, result_summary);

        let mut inner = self.lock_inner();
        inner.entries.insert(0, entry);
        inner.entries.truncate(self.config.max_entries);
        self.schedule_write(&mut inner);
    }

    /// Removes the entry with the given id, if present. Relative order of
    /// the remainder is preserved.
    pub fn delete_entry(&self, id: Uuid) {
        let mut inner = self.lock_inner();
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.id != id);
        if inner.entries.len() != before {
            self.schedule_write(&mut inner);
        }
    }

    /// Removes the entry at the given position (0 = most recent), if any.
    pub fn delete_at(&self, index: usize) {
        let mut inner = self.lock_inner();
        if index < inner.entries.len() {
            inner.entries.remove(index);
            self.schedule_write(&mut inner);
        }
    }

    /// Empties the history and persists the clear immediately.
    ///
    /// Not debounced: clearing must not be lost to a crash inside the
    /// debounce window. A still-sleeping pending write is cancelled; one
    /// already past its sleep holds the write gate, so taking the gate here
    /// waits it out before the persisted blob is removed. Either way no
    /// write can land after the clear and resurrect deleted entries.
    pub async fn clear_all(&self) {
        {
            let mut inner = self.lock_inner();
            inner.entries.clear();
            inner.generation += 1;
            if let Some(pending) = inner.pending_write.take() {
                pending.abort();
            }
        }

        let _write = self.write_gate.lock().await;

        if let Err(err) = self.repository.clear().await {
            tracing::warn!("Failed to clear persisted history: {}", err);
        }
    }

    /// Replaces any pending write with one for the state as of this
    /// mutation.
    ///
    /// The spawned task snapshots the entries when it *fires*, not when it
    /// is scheduled, so state merged in behind it (hydration) is included
    /// rather than overwritten. The generation recorded here lets the task
    /// detect that it was superseded and skip its save.
    fn schedule_write(&self, inner: &mut StoreInner) {
        inner.generation += 1;
        if let Some(pending) = inner.pending_write.take() {
            pending.abort();
        }

        let scheduled = inner.generation;
        let shared = Arc::clone(&self.inner);
        let gate = Arc::clone(&self.write_gate);
        let repository = Arc::clone(&self.repository);
        let debounce = self.config.write_debounce;

        inner.pending_write = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Commit point: from here on this task must not be aborted, or
            // a cancelled save could leave a detached blocking write racing
            // a later clear. Taking our own handle out of pending_write
            // guarantees nobody aborts a write past its sleep.
            let snapshot = {
                let mut inner = lock_shared(&shared);
                if inner.generation != scheduled {
                    // Superseded while sleeping; the newer mutation owns
                    // pending_write now.
                    return;
                }
                inner.pending_write = None;
                inner.entries.clone()
            };

            let _write = gate.lock().await;

            // Re-check after acquiring the gate: a clear_all (or a newer
            // mutation) that got in first makes this snapshot stale.
            if lock_shared(&shared).generation != scheduled {
                return;
            }

            if let Err(err) = repository.save(&snapshot).await {
                tracing::warn!("Failed to save calculation history: {}", err);
            }
        }));
    }

    async fn hydrate(self: Arc<Self>) {
        match self.repository.load().await {
            Ok(Some(loaded)) => {
                let count = loaded.len();
                let mut inner = self.lock_inner();
                // Entries added before hydration finished stay in front of
                // the persisted ones.
                inner.entries.extend(loaded);
                inner.entries.truncate(self.config.max_entries);
                if inner.generation > 0 {
                    // Mutations raced hydration and worked from a partial
                    // view; persist the merged snapshot so a write that
                    // already fired cannot leave the blob stale.
                    self.schedule_write(&mut inner);
                }
                drop(inner);
                tracing::debug!("Hydrated {} history entries", count);
            }
            Ok(None) => {
                tracing::debug!("No saved history found");
            }
            Err(err) => {
                // Storage read failures degrade to an empty history.
                tracing::warn!("Failed to load calculation history: {}", err);
            }
        }

        let _ = self.hydrated_tx.send(true);
    }
}

impl Drop for HistoryStore {
    fn drop(&mut self) {
        // Cancel, do not await: a write in flight past the sleep still
        // completes on the runtime; one still sleeping is abandoned.
        if let Some(pending) = self.lock_inner().pending_write.take() {
            pending.abort();
        }
    }
}
