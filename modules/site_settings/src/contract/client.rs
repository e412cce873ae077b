//! Native client trait for in-process consumers
//!
//! The provider and any other module talk to the settings service through
//! this trait. NO HTTP - direct function calls.

use super::error::SettingsError;
use super::model::{
    CategoryPatch, SettingsAction, SettingsExport, SettingsSnapshot, SiteSettings,
    SiteSettingsPatch, UpdateOutcome,
};
use async_trait::async_trait;

/// Site settings API for inter-module communication
#[async_trait]
pub trait SiteSettingsApi: Send + Sync {
    // ===== Reads =====

    /// Current settings, defaults when nothing usable is persisted
    async fn get_settings(&self) -> Result<SiteSettings, SettingsError>;

    /// Current settings with the revision they were persisted at
    async fn get_snapshot(&self) -> Result<SettingsSnapshot, SettingsError>;

    // ===== Mutations =====

    /// Replace one leaf or sub-tree addressed by a dot path
    async fn update_setting(
        &self,
        path: &str,
        value: serde_json::Value,
    ) -> Result<UpdateOutcome, SettingsError>;

    /// Replace every category present in `patch`
    async fn update_settings(
        &self,
        patch: SiteSettingsPatch,
    ) -> Result<UpdateOutcome, SettingsError>;

    /// Merge fields within one category
    async fn update_category_settings(
        &self,
        patch: CategoryPatch,
    ) -> Result<UpdateOutcome, SettingsError>;

    /// Uniform mutation entry point
    async fn dispatch(&self, action: SettingsAction) -> Result<UpdateOutcome, SettingsError>;

    /// Replace persisted settings with the defaults
    async fn reset_to_defaults(&self) -> Result<UpdateOutcome, SettingsError>;

    // ===== Import / export =====

    async fn export_settings(&self) -> Result<SettingsExport, SettingsError>;

    /// Parse a raw JSON document and import it
    async fn import_settings(&self, raw: &str) -> Result<UpdateOutcome, SettingsError>;

    // ===== Cache =====

    /// Drop memoized state so the next read hits the store
    async fn clear_cache(&self);
}
