use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::{EntryId, NewEntry, StoreError, StoreResult, WaitlistStore};

/// A persisted entry as kept by `MemoryStore`.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: EntryId,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

/// Keeps entries in a `Vec`. Used for local runs and tests.
/// Can be switched into a failing mode with `set_unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<StoredEntry>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every insert fails with `StoreUnavailable` and nothing is written.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// A snapshot of everything written so far, in insertion order.
    pub fn entries(&self) -> Vec<StoredEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl WaitlistStore for MemoryStore {
    async fn insert(&self, entry: NewEntry) -> StoreResult<EntryId> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::StoreUnavailable(
                "memory store switched off".to_string(),
            ));
        }

        let id = EntryId::new(Uuid::new_v4().simple().to_string());
        let stored = StoredEntry {
            id: id.clone(),
            email: entry.email.as_ref().to_string(),
            joined_at: entry.joined_at,
        };

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored);
        debug!(inserted_id = %id, "entry kept in memory");

        Ok(id)
    }
}
