//! In-memory settings store for tests and local development

use crate::domain::repository::{SettingsStore, StoreError, StoredSettings};
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
pub struct InMemorySettingsStore {
    record: RwLock<Option<StoredSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing raw record (e.g. to simulate corrupted data)
    pub fn with_record(revision: u64, data: impl Into<String>) -> Self {
        Self {
            record: RwLock::new(Some(StoredSettings {
                revision,
                data: data.into(),
                updated_at: chrono::Utc::now(),
            })),
        }
    }

    /// Raw record currently held
    pub fn record(&self) -> Option<StoredSettings> {
        self.record.read().clone()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<Option<StoredSettings>, StoreError> {
        Ok(self.record.read().clone())
    }

    async fn save(
        &self,
        data: String,
        expected_revision: u64,
    ) -> Result<StoredSettings, StoreError> {
        let mut guard = self.record.write();
        let actual = guard.as_ref().map_or(0, |r| r.revision);
        if actual != expected_revision {
            return Err(StoreError::Conflict {
                expected: expected_revision,
                actual,
            });
        }

        let record = StoredSettings {
            revision: actual + 1,
            data,
            updated_at: chrono::Utc::now(),
        };
        *guard = Some(record.clone());
        Ok(record)
    }
}
