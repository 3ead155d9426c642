//! The waitlist store: the only place entries get persisted.
//!
//! `WaitlistStore` is a single-method port so the signup flow doesn't care whether it talks to
//! MongoDB or to process memory. Concurrent inserts are serialized by the backend itself.

mod memory;
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    config::{StoreBackend, StoreConfig},
    email::ValidEmail,
};

// re-export
pub use memory::{MemoryStore, StoredEntry};
pub use mongo::MongoStore;

// ###################################
// ->   STRUCTS
// ###################################
/// An entry that is about to be written. The timestamp is taken when the entry is built.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub email: ValidEmail,
    pub joined_at: DateTime<Utc>,
}

impl NewEntry {
    pub fn new(email: ValidEmail) -> Self {
        NewEntry {
            email,
            joined_at: Utc::now(),
        }
    }
}

/// Opaque identifier assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        EntryId(id.into())
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Writes one entry and returns the id the store assigned to it.
    /// Every call has to work on a cold connection.
    async fn insert(&self, entry: NewEntry) -> StoreResult<EntryId>;
}

/// Builds the backend selected in the configuration.
pub fn from_config(config: &StoreConfig) -> Arc<dyn WaitlistStore> {
    info!(
        "{:<20} - Using the {:?} waitlist store",
        "store", config.backend
    );
    match config.backend {
        StoreBackend::Mongo => Arc::new(MongoStore::new(config)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
}
