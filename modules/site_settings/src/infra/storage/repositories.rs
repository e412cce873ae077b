//! SeaORM settings store

use super::entity;
use super::mapper::{revision_from_db, revision_to_db};
use crate::domain::repository::{SettingsStore, StoreError, StoredSettings};
use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{
    prelude::Expr, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::sync::Arc;

/// Row key used when none is configured
pub const DEFAULT_SETTINGS_KEY: &str = "site";

pub struct SeaOrmSettingsStore {
    db: Arc<DatabaseConnection>,
    key: String,
}

impl SeaOrmSettingsStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self::with_key(db, DEFAULT_SETTINGS_KEY)
    }

    pub fn with_key(db: Arc<DatabaseConnection>, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    async fn find_row(&self) -> anyhow::Result<Option<entity::Model>> {
        entity::Entity::find_by_id(self.key.clone())
            .one(&*self.db)
            .await
            .context("loading site settings row")
    }

    async fn actual_revision(&self) -> anyhow::Result<u64> {
        match self.find_row().await? {
            Some(row) => revision_from_db(row.revision),
            None => Ok(0),
        }
    }

    async fn insert_first(&self, data: String) -> Result<StoredSettings, StoreError> {
        let now = chrono::Utc::now();
        let active = entity::ActiveModel {
            key: Set(self.key.clone()),
            revision: Set(1),
            data: Set(data.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = entity::Entity::insert(active).exec(&*self.db).await {
            // Lost the race for the first write
            let actual = self.actual_revision().await?;
            if actual != 0 {
                return Err(StoreError::Conflict {
                    expected: 0,
                    actual,
                });
            }
            return Err(anyhow::Error::new(e).context("inserting site settings row").into());
        }

        Ok(StoredSettings {
            revision: 1,
            data,
            updated_at: now,
        })
    }
}

#[async_trait]
impl SettingsStore for SeaOrmSettingsStore {
    async fn load(&self) -> Result<Option<StoredSettings>, StoreError> {
        match self.find_row().await? {
            Some(row) => Ok(Some(StoredSettings::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        data: String,
        expected_revision: u64,
    ) -> Result<StoredSettings, StoreError> {
        if expected_revision == 0 && self.find_row().await?.is_none() {
            return self.insert_first(data).await;
        }

        let now = chrono::Utc::now();
        let next = expected_revision + 1;
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::Data, Expr::value(data.clone()))
            .col_expr(entity::Column::Revision, Expr::value(revision_to_db(next)?))
            .col_expr(entity::Column::UpdatedAt, Expr::value(now))
            .filter(entity::Column::Key.eq(self.key.clone()))
            .filter(entity::Column::Revision.eq(revision_to_db(expected_revision)?))
            .exec(&*self.db)
            .await
            .context("updating site settings row")?;

        if result.rows_affected == 0 {
            let actual = self.actual_revision().await?;
            tracing::debug!(expected = expected_revision, actual, "Settings revision moved");
            return Err(StoreError::Conflict {
                expected: expected_revision,
                actual,
            });
        }

        Ok(StoredSettings {
            revision: next,
            data,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::migrations::Migrator;
    use super::*;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    async fn connect() -> Arc<DatabaseConnection> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Arc::new(db)
    }

    async fn store() -> SeaOrmSettingsStore {
        SeaOrmSettingsStore::new(connect().await)
    }

    #[tokio::test]
    async fn test_empty_table_loads_none() {
        let store = store().await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_then_update() {
        let store = store().await;

        let first = store.save("{\"v\":1}".to_string(), 0).await.unwrap();
        assert_eq!(first.revision, 1);

        let second = store.save("{\"v\":2}".to_string(), 1).await.unwrap();
        assert_eq!(second.revision, 2);

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.revision, 2);
        assert_eq!(loaded.data, "{\"v\":2}");
    }

    #[tokio::test]
    async fn test_stale_writes_conflict() {
        let store = store().await;
        store.save("{}".to_string(), 0).await.unwrap();
        store.save("{}".to_string(), 1).await.unwrap();

        assert!(matches!(
            store.save("{}".to_string(), 0).await,
            Err(StoreError::Conflict {
                expected: 0,
                actual: 2
            })
        ));
        assert!(matches!(
            store.save("{}".to_string(), 1).await,
            Err(StoreError::Conflict {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_keys_are_independent_rows() {
        let db = connect().await;
        let default = SeaOrmSettingsStore::new(db.clone());
        let staging = SeaOrmSettingsStore::with_key(db.clone(), "staging");

        staging.save("{\"env\":\"staging\"}".to_string(), 0).await.unwrap();
        staging.save("{\"env\":\"staging\"}".to_string(), 1).await.unwrap();
        assert!(default.load().await.unwrap().is_none());

        let first = default.save("{}".to_string(), 0).await.unwrap();
        assert_eq!(first.revision, 1, "revisions are counted per key");
        assert_eq!(staging.load().await.unwrap().unwrap().revision, 2);

        let row = entity::Entity::find_by_id(DEFAULT_SETTINGS_KEY.to_string())
            .one(&*db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.data, "{}");
    }
}
