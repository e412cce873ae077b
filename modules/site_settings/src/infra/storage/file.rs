//! JSON file settings store
//!
//! The file holds `{ "revision", "updatedAt", "settings" }`. Writes go to a
//! sibling temp file that is renamed over the original. A file that cannot
//! be parsed as that envelope is handed to the service as revision 0 with
//! its raw contents, so the service falls back to defaults and the next
//! save overwrites it.

use crate::domain::repository::{SettingsStore, StoreError, StoredSettings};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRecord {
    revision: u64,
    updated_at: DateTime<Utc>,
    settings: serde_json::Value,
}

pub struct FileSettingsStore {
    path: PathBuf,
    /// Serializes read-compare-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_record(&self) -> anyhow::Result<Option<StoredSettings>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading settings file {}", self.path.display()))
            }
        };

        match serde_json::from_str::<FileRecord>(&contents) {
            Ok(record) => Ok(Some(StoredSettings {
                revision: record.revision,
                data: record.settings.to_string(),
                updated_at: record.updated_at,
            })),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Settings file is not a valid record"
                );
                Ok(Some(StoredSettings {
                    revision: 0,
                    data: contents,
                    updated_at: Utc::now(),
                }))
            }
        }
    }

    async fn write_record(&self, record: &FileRecord) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let body = serde_json::to_string_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Option<StoredSettings>, StoreError> {
        Ok(self.read_record().await?)
    }

    async fn save(
        &self,
        data: String,
        expected_revision: u64,
    ) -> Result<StoredSettings, StoreError> {
        let _guard = self.write_lock.lock().await;

        let actual = self.read_record().await?.map_or(0, |r| r.revision);
        if actual != expected_revision {
            return Err(StoreError::Conflict {
                expected: expected_revision,
                actual,
            });
        }

        let settings: serde_json::Value =
            serde_json::from_str(&data).context("settings blob is not JSON")?;
        let record = FileRecord {
            revision: actual + 1,
            updated_at: Utc::now(),
            settings,
        };
        self.write_record(&record).await?;
        tracing::debug!(path = %self.path.display(), revision = record.revision, "Settings file written");

        Ok(StoredSettings {
            revision: record.revision,
            data,
            updated_at: record.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = FileSettingsStore::new(&path);

        let saved = store.save(r#"{"a":1}"#.to_string(), 0).await.unwrap();
        assert_eq!(saved.revision, 1);
        assert!(path.exists());

        let reopened = FileSettingsStore::new(&path);
        let loaded = reopened.load().await.unwrap().unwrap();
        assert_eq!(loaded.revision, 1);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&loaded.data).unwrap(),
            serde_json::json!({ "a": 1 })
        );
    }

    #[tokio::test]
    async fn test_conflict_on_stale_revision() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        store.save("{}".to_string(), 0).await.unwrap();

        let result = store.save("{}".to_string(), 0).await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict {
                expected: 0,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_revision_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{not valid").await.unwrap();

        let store = FileSettingsStore::new(&path);
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.revision, 0);
        assert_eq!(loaded.data, "{not valid");

        // Overwritable from revision 0
        assert_eq!(store.save("{}".to_string(), 0).await.unwrap().revision, 1);
    }
}
