//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    CategoryPatch, SettingsAction, SettingsError, SettingsExport, SettingsSnapshot,
    SiteSettings, SiteSettingsApi, SiteSettingsPatch, UpdateOutcome,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// Every provider in the process shares one client, and so one service and
/// one memo.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SiteSettingsApi for NativeClient {
    async fn get_settings(&self) -> Result<SiteSettings, SettingsError> {
        self.service.get_settings().await
    }

    async fn get_snapshot(&self) -> Result<SettingsSnapshot, SettingsError> {
        self.service.get_snapshot().await
    }

    async fn update_setting(
        &self,
        path: &str,
        value: serde_json::Value,
    ) -> Result<UpdateOutcome, SettingsError> {
        self.service.update_setting(path, value).await
    }

    async fn update_settings(
        &self,
        patch: SiteSettingsPatch,
    ) -> Result<UpdateOutcome, SettingsError> {
        self.service.update_settings(patch).await
    }

    async fn update_category_settings(
        &self,
        patch: CategoryPatch,
    ) -> Result<UpdateOutcome, SettingsError> {
        self.service.update_category_settings(patch).await
    }

    async fn dispatch(&self, action: SettingsAction) -> Result<UpdateOutcome, SettingsError> {
        self.service.dispatch(action).await
    }

    async fn reset_to_defaults(&self) -> Result<UpdateOutcome, SettingsError> {
        self.service.reset_to_defaults().await
    }

    async fn export_settings(&self) -> Result<SettingsExport, SettingsError> {
        self.service.export_settings().await
    }

    async fn import_settings(&self, raw: &str) -> Result<UpdateOutcome, SettingsError> {
        self.service.import_settings(raw).await
    }

    async fn clear_cache(&self) {
        self.service.clear_cache();
    }
}
