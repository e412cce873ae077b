//! Repository trait for the persisted settings blob
//!
//! Implementations are in infra/storage. The store knows nothing about the
//! schema: it keeps a JSON blob plus a revision counter and performs a
//! compare-and-swap on write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persisted settings record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSettings {
    /// Incremented by one on every successful save
    pub revision: u64,
    /// Serialized `SiteSettings`; may be unparseable if the store was tampered with
    pub data: String,
    pub updated_at: DateTime<Utc>,
}

/// Errors raised by a settings store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("revision conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Backing store for the settings blob
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the current record, `None` when nothing was ever saved
    async fn load(&self) -> Result<Option<StoredSettings>, StoreError>;

    /// Write `data` if the persisted revision equals `expected_revision`
    ///
    /// `expected_revision` is 0 when nothing is persisted yet. On success the
    /// new record carries `expected_revision + 1`.
    async fn save(&self, data: String, expected_revision: u64)
        -> Result<StoredSettings, StoreError>;
}
