//! Domain service - the only gateway to persisted settings

use super::defaults::default_site_settings;
use super::events::{EventPublisher, SettingsChange, SettingsEvent};
use super::import::{extract_settings, parse_import_json};
use super::path::set_setting_by_path;
use super::repository::{SettingsStore, StoreError};
use super::validation::validate_settings;
use crate::contract::{
    CategoryPatch, ExportMetadata, SettingsAction, SettingsCategory, SettingsError,
    SettingsExport, SettingsSnapshot, SiteSettings, SiteSettingsPatch, UpdateOutcome,
    ValidationResult, EXPORT_VERSION,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Service options taken from the module configuration
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Recorded as `metadata.exportedBy` in exports
    pub exported_by: String,
    /// Largest serialized settings blob accepted for persistence
    pub max_data_size: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            exported_by: "admin".to_string(),
            max_data_size: 1024 * 1024,
        }
    }
}

/// Domain service for site settings
///
/// Every mutation reads the current snapshot, builds the complete new value,
/// validates it and saves it with a compare-and-swap on the revision. A
/// write based on a stale revision fails with `SettingsError::Conflict`.
pub struct Service {
    store: Arc<dyn SettingsStore>,
    event_publisher: Arc<dyn EventPublisher>,
    options: ServiceOptions,
    /// Last snapshot read from or written to the store
    memo: RwLock<Option<SettingsSnapshot>>,
}

fn map_store_error(err: StoreError) -> SettingsError {
    match err {
        StoreError::Conflict { expected, actual } => SettingsError::Conflict { expected, actual },
        StoreError::Backend(e) => {
            error!(error = %e, "Settings store failure");
            SettingsError::Persistence {
                message: e.to_string(),
            }
        }
    }
}

impl Service {
    /// Create a new service instance
    pub fn new(
        store: Arc<dyn SettingsStore>,
        event_publisher: Arc<dyn EventPublisher>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            event_publisher,
            options,
            memo: RwLock::new(None),
        }
    }

    // ===== Reads =====

    /// Current settings; defaults when nothing (usable) is persisted
    pub async fn get_settings(&self) -> Result<SiteSettings, SettingsError> {
        Ok(self.get_snapshot().await?.settings)
    }

    /// Current settings with their persisted revision
    pub async fn get_snapshot(&self) -> Result<SettingsSnapshot, SettingsError> {
        let cached = self.memo.read().clone();
        if let Some(snapshot) = cached {
            debug!(revision = snapshot.revision, "Settings cache hit");
            return Ok(snapshot);
        }

        let record = self.store.load().await.map_err(map_store_error)?;
        let snapshot = match record {
            None => {
                debug!("No persisted settings, using defaults");
                SettingsSnapshot {
                    revision: 0,
                    settings: default_site_settings(),
                }
            }
            Some(record) => match serde_json::from_str::<SiteSettings>(&record.data) {
                Ok(settings) => SettingsSnapshot {
                    revision: record.revision,
                    settings,
                },
                Err(e) => {
                    warn!(
                        revision = record.revision,
                        error = %e,
                        "Persisted settings are unreadable, falling back to defaults"
                    );
                    SettingsSnapshot {
                        revision: record.revision,
                        settings: default_site_settings(),
                    }
                }
            },
        };

        Ok(self.remember(snapshot))
    }

    /// Revision of the memoized snapshot, if any
    pub fn current_revision(&self) -> Option<u64> {
        self.memo.read().as_ref().map(|s| s.revision)
    }

    /// Drop the memoized snapshot so the next read hits the store
    pub fn clear_cache(&self) {
        *self.memo.write() = None;
        debug!("Settings cache cleared");
    }

    // ===== Mutations =====

    /// Replace the value at a dot path
    pub async fn update_setting(
        &self,
        path: &str,
        value: serde_json::Value,
    ) -> Result<UpdateOutcome, SettingsError> {
        let base = self.get_snapshot().await?;
        let next = set_setting_by_path(&base.settings, path, value)?;
        debug!(path, "Applying path update");
        self.commit(&base, next, SettingsChange::Updated).await
    }

    /// Replace every category present in `patch`
    pub async fn update_settings(
        &self,
        patch: SiteSettingsPatch,
    ) -> Result<UpdateOutcome, SettingsError> {
        let base = self.get_snapshot().await?;
        let mut next = base.settings.clone();
        patch.apply_to(&mut next);
        self.commit(&base, next, SettingsChange::Updated).await
    }

    /// Merge fields within one category
    pub async fn update_category_settings(
        &self,
        patch: CategoryPatch,
    ) -> Result<UpdateOutcome, SettingsError> {
        let base = self.get_snapshot().await?;
        let category = patch.category();
        let mut next = base.settings.clone();
        patch.apply_to(&mut next);
        debug!(%category, "Applying category update");
        self.commit(&base, next, SettingsChange::Updated).await
    }

    /// Merge an untyped partial into one category
    pub async fn update_category_settings_json(
        &self,
        category: SettingsCategory,
        partial: serde_json::Value,
    ) -> Result<UpdateOutcome, SettingsError> {
        let patch = CategoryPatch::from_json(category, partial)?;
        self.update_category_settings(patch).await
    }

    /// Uniform mutation entry point
    pub async fn dispatch(&self, action: SettingsAction) -> Result<UpdateOutcome, SettingsError> {
        info!(action = action.name(), "Dispatching settings action");
        match action {
            SettingsAction::UpdateGeneral(p) => {
                self.update_category_settings(CategoryPatch::General(p)).await
            }
            SettingsAction::UpdateSeoAnalytics(p) => {
                self.update_category_settings(CategoryPatch::SeoAnalytics(p)).await
            }
            SettingsAction::UpdateUserManagement(p) => {
                self.update_category_settings(CategoryPatch::UserManagement(p)).await
            }
            SettingsAction::UpdateContentPublishing(p) => {
                self.update_category_settings(CategoryPatch::ContentPublishing(p))
                    .await
            }
            SettingsAction::UpdateSecurityPrivacy(p) => {
                self.update_category_settings(CategoryPatch::SecurityPrivacy(p)).await
            }
            SettingsAction::UpdateMarketingSeo(p) => {
                self.update_category_settings(CategoryPatch::MarketingSeo(p)).await
            }
            SettingsAction::ResetToDefaults => self.reset_to_defaults().await,
            SettingsAction::ImportSettings(settings) => self.import_parsed(*settings).await,
        }
    }

    /// Replace persisted settings with the defaults
    ///
    /// Defaults are valid by construction, so only the store can fail this.
    pub async fn reset_to_defaults(&self) -> Result<UpdateOutcome, SettingsError> {
        let base = self.get_snapshot().await?;
        let defaults = default_site_settings();
        self.persist(&base, defaults, SettingsChange::Reset).await?;
        Ok(UpdateOutcome::committed(ValidationResult::new()))
    }

    // ===== Import / export =====

    /// Wrap current settings in a versioned export envelope
    pub async fn export_settings(&self) -> Result<SettingsExport, SettingsError> {
        let settings = self.get_settings().await?;
        let site_name = settings.general.site_identity.site_title.clone();
        Ok(SettingsExport {
            version: EXPORT_VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            settings,
            metadata: ExportMetadata {
                site_name,
                exported_by: self.options.exported_by.clone(),
            },
        })
    }

    /// Parse, shape-check, validate and persist a raw JSON import
    pub async fn import_settings(&self, raw: &str) -> Result<UpdateOutcome, SettingsError> {
        let payload = parse_import_json(raw)?;
        match extract_settings(payload) {
            Ok(settings) => self.import_parsed(settings).await,
            Err(validation) => {
                info!(
                    errors = validation.errors.len(),
                    "Import rejected: payload does not match the schema"
                );
                Ok(UpdateOutcome::rejected(validation))
            }
        }
    }

    /// Validate and persist an already-typed settings value
    pub async fn import_parsed(
        &self,
        settings: SiteSettings,
    ) -> Result<UpdateOutcome, SettingsError> {
        let base = self.get_snapshot().await?;
        self.commit(&base, settings, SettingsChange::Imported).await
    }

    // ===== Helper Methods =====

    /// Memoize `snapshot` unless a newer revision is already memoized
    ///
    /// Returns whatever the memo holds afterwards.
    fn remember(&self, snapshot: SettingsSnapshot) -> SettingsSnapshot {
        let mut memo = self.memo.write();
        match memo.as_ref() {
            Some(current) if current.revision > snapshot.revision => {
                debug!(
                    memoized = current.revision,
                    stale = snapshot.revision,
                    "Keeping newer memoized settings"
                );
                current.clone()
            }
            _ => {
                *memo = Some(snapshot.clone());
                snapshot
            }
        }
    }

    /// Validate `next` and persist it on success
    async fn commit(
        &self,
        base: &SettingsSnapshot,
        next: SiteSettings,
        change: SettingsChange,
    ) -> Result<UpdateOutcome, SettingsError> {
        let validation = validate_settings(&next);
        if !validation.is_valid {
            info!(
                errors = validation.errors.len(),
                "Settings update rejected by validation"
            );
            return Ok(UpdateOutcome::rejected(validation));
        }

        self.persist(base, next, change).await?;
        Ok(UpdateOutcome::committed(validation))
    }

    /// Save with compare-and-swap, refresh the memo and publish the change
    async fn persist(
        &self,
        base: &SettingsSnapshot,
        next: SiteSettings,
        change: SettingsChange,
    ) -> Result<SettingsSnapshot, SettingsError> {
        let data = serde_json::to_string(&next).map_err(|e| {
            error!(error = %e, "Failed to serialize settings");
            SettingsError::Internal
        })?;

        if data.len() > self.options.max_data_size {
            return Err(SettingsError::Validation {
                message: format!(
                    "Settings payload is {} bytes, limit is {}",
                    data.len(),
                    self.options.max_data_size
                ),
            });
        }

        let record = match self.store.save(data, base.revision).await {
            Ok(record) => record,
            Err(e) => {
                // Whatever is persisted now, the memo no longer describes it
                self.clear_cache();
                return Err(map_store_error(e));
            }
        };

        let snapshot = SettingsSnapshot {
            revision: record.revision,
            settings: next,
        };
        self.remember(snapshot.clone());
        info!(revision = snapshot.revision, ?change, "Settings committed");

        let event = SettingsEvent::new(change, &snapshot);
        if let Err(e) = self.event_publisher.publish(event).await {
            warn!(error = %e, "Failed to publish settings event");
        }

        Ok(snapshot)
    }
}
