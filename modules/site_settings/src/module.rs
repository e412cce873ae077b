//! Module declaration and lifecycle
//!
//! `SiteSettingsModule` wires the configured store, the service, the event
//! bus and the process-wide provider together. Nothing is global: tests and
//! hosts construct as many independent modules as they need.

use crate::api::native::NativeClient;
use crate::config::{Config, StorageConfig};
use crate::contract::SiteSettingsApi;
use crate::domain::{Service, ServiceOptions, SettingsStore};
use crate::infra::storage::{
    FileSettingsStore, InMemorySettingsStore, Migrator, SeaOrmSettingsStore,
};
use crate::infra::{FileExportSink, SettingsEventBus};
use crate::provider::notify::{Notifier, TracingNotifier};
use crate::provider::SettingsProvider;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Site settings module
pub struct SiteSettingsModule {
    config: RwLock<Config>,
    notifier: Arc<dyn Notifier>,
    event_bus: SettingsEventBus,
    service: RwLock<Option<Arc<Service>>>,
    client: RwLock<Option<Arc<dyn SiteSettingsApi>>>,
    provider: RwLock<Option<Arc<SettingsProvider>>>,
}

impl Default for SiteSettingsModule {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl SiteSettingsModule {
    pub fn new(config: Config) -> Self {
        let event_bus = SettingsEventBus::new(config.event_channel_capacity);
        Self {
            config: RwLock::new(config),
            notifier: Arc::new(TracingNotifier),
            event_bus,
            service: RwLock::new(None),
            client: RwLock::new(None),
            provider: RwLock::new(None),
        }
    }

    /// Route provider notifications somewhere other than the log
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Build the store and service, then load the provider
    pub async fn init(&self) -> Result<()> {
        let cfg = self.config.read().clone();

        let store = build_store(&cfg.storage).await?;
        let service = Arc::new(Service::new(
            store,
            Arc::new(self.event_bus.clone()),
            ServiceOptions {
                exported_by: cfg.exported_by.clone(),
                max_data_size: cfg.max_data_size,
            },
        ));
        let client: Arc<dyn SiteSettingsApi> = Arc::new(NativeClient::new(service.clone()));

        let provider = Arc::new(
            SettingsProvider::new(client.clone(), self.notifier.clone())
                .with_event_bus(self.event_bus.clone())
                .with_export_sink(Arc::new(FileExportSink::new(cfg.export_dir.clone()))),
        );
        provider
            .init()
            .await
            .context("loading site settings")?;

        // Published only once the provider has loaded
        *self.service.write() = Some(service);
        *self.client.write() = Some(client);
        *self.provider.write() = Some(provider);

        tracing::info!(storage = ?cfg.storage, "Site settings module initialized");
        Ok(())
    }

    /// Stop the provider's listener; the module can be re-initialized
    pub async fn dispose(&self) {
        let provider = self.provider.write().take();
        if let Some(provider) = provider {
            provider.dispose().await;
        }
        *self.client.write() = None;
        *self.service.write() = None;
        tracing::info!("Site settings module disposed");
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    pub fn client(&self) -> Result<Arc<dyn SiteSettingsApi>> {
        self.client
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Client not initialized"))
    }

    pub fn provider(&self) -> Result<Arc<SettingsProvider>> {
        self.provider
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Provider not initialized"))
    }

    /// Additional provider sharing this module's service and event bus
    pub async fn new_provider(&self) -> Result<Arc<SettingsProvider>> {
        let provider = Arc::new(
            SettingsProvider::new(self.client()?, self.notifier.clone())
                .with_event_bus(self.event_bus.clone()),
        );
        provider.init().await?;
        Ok(provider)
    }
}

async fn build_store(storage: &StorageConfig) -> Result<Arc<dyn SettingsStore>> {
    let store: Arc<dyn SettingsStore> = match storage {
        StorageConfig::Memory => Arc::new(InMemorySettingsStore::new()),
        StorageConfig::File { path } => Arc::new(FileSettingsStore::new(path.clone())),
        StorageConfig::Database { url } => {
            let mut opts = ConnectOptions::new(url.clone());
            opts.sqlx_logging(false);
            if url.contains(":memory:") {
                // Each in-memory SQLite connection is its own database
                opts.max_connections(1).min_connections(1);
            }
            let db = Database::connect(opts)
                .await
                .with_context(|| format!("connecting to {}", url))?;
            Migrator::up(&db, None).await?;
            tracing::info!("Site settings migrations completed");
            Arc::new(SeaOrmSettingsStore::new(Arc::new(db)))
        }
    };
    Ok(store)
}
