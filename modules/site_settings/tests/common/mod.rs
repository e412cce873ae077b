//! Common test utilities: mock stores, recording notifier and export sink

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use site_settings::api::native::NativeClient;
use site_settings::contract::{
    CategoryPatch, SettingsAction, SettingsError, SettingsExport, SettingsSnapshot, SiteSettings,
    SiteSettingsApi, SiteSettingsPatch, UpdateOutcome,
};
use site_settings::domain::events::{EventPublisher, SettingsEvent};
use site_settings::domain::repository::{SettingsStore, StoreError, StoredSettings};
use site_settings::domain::{Service, ServiceOptions};
use site_settings::infra::storage::InMemorySettingsStore;
use site_settings::infra::SettingsEventBus;
use site_settings::provider::export::ExportSink;
use site_settings::provider::notify::Notifier;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("site_settings=debug")
        .try_init();
}

/// Service over a fresh in-memory store
pub fn memory_service() -> (Arc<Service>, Arc<InMemorySettingsStore>) {
    let store = Arc::new(InMemorySettingsStore::new());
    let service = service_over(store.clone(), Arc::new(RecordingPublisher::default()));
    (service, store)
}

pub fn service_over(
    store: Arc<dyn SettingsStore>,
    publisher: Arc<dyn EventPublisher>,
) -> Arc<Service> {
    Arc::new(Service::new(store, publisher, ServiceOptions::default()))
}

/// Service publishing to a shared bus, as wired by the module
pub fn bus_service(bus: &SettingsEventBus) -> Arc<Service> {
    service_over(
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(bus.clone()),
    )
}

// ===== Stores =====

/// Store whose reads and writes can be switched to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemorySettingsStore,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsStore for FlakyStore {
    async fn load(&self) -> Result<Option<StoredSettings>, StoreError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("storage unavailable").into());
        }
        self.inner.load().await
    }

    async fn save(
        &self,
        data: String,
        expected_revision: u64,
    ) -> Result<StoredSettings, StoreError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("quota exceeded").into());
        }
        self.inner.save(data, expected_revision).await
    }
}

/// Store that can hold a load, or a committed save, until released
///
/// `entered` fires once the held call has reached the gate. A held save has
/// already committed to the inner store.
#[derive(Default)]
pub struct GatedStore {
    inner: InMemorySettingsStore,
    gate_load: AtomicBool,
    gate_save: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the next load
    pub fn hold_load(&self) {
        self.gate_load.store(true, Ordering::SeqCst);
    }

    /// Hold the next save after it commits
    pub fn hold_save(&self) {
        self.gate_save.store(true, Ordering::SeqCst);
    }

    async fn wait_if(&self, gate: &AtomicBool) {
        if gate.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl SettingsStore for GatedStore {
    async fn load(&self) -> Result<Option<StoredSettings>, StoreError> {
        self.wait_if(&self.gate_load).await;
        self.inner.load().await
    }

    async fn save(
        &self,
        data: String,
        expected_revision: u64,
    ) -> Result<StoredSettings, StoreError> {
        let stored = self.inner.save(data, expected_revision).await?;
        self.wait_if(&self.gate_save).await;
        Ok(stored)
    }
}

// ===== Clients =====

/// Native client that counts snapshot reads
pub struct CountingClient {
    inner: NativeClient,
    snapshots: AtomicUsize,
}

impl CountingClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            inner: NativeClient::new(service),
            snapshots: AtomicUsize::new(0),
        }
    }

    pub fn snapshot_reads(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SiteSettingsApi for CountingClient {
    async fn get_settings(&self) -> Result<SiteSettings, SettingsError> {
        self.inner.get_settings().await
    }

    async fn get_snapshot(&self) -> Result<SettingsSnapshot, SettingsError> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        self.inner.get_snapshot().await
    }

    async fn update_setting(
        &self,
        path: &str,
        value: serde_json::Value,
    ) -> Result<UpdateOutcome, SettingsError> {
        self.inner.update_setting(path, value).await
    }

    async fn update_settings(
        &self,
        patch: SiteSettingsPatch,
    ) -> Result<UpdateOutcome, SettingsError> {
        self.inner.update_settings(patch).await
    }

    async fn update_category_settings(
        &self,
        patch: CategoryPatch,
    ) -> Result<UpdateOutcome, SettingsError> {
        self.inner.update_category_settings(patch).await
    }

    async fn dispatch(&self, action: SettingsAction) -> Result<UpdateOutcome, SettingsError> {
        self.inner.dispatch(action).await
    }

    async fn reset_to_defaults(&self) -> Result<UpdateOutcome, SettingsError> {
        self.inner.reset_to_defaults().await
    }

    async fn export_settings(&self) -> Result<SettingsExport, SettingsError> {
        self.inner.export_settings().await
    }

    async fn import_settings(&self, raw: &str) -> Result<UpdateOutcome, SettingsError> {
        self.inner.import_settings(raw).await
    }

    async fn clear_cache(&self) {
        self.inner.clear_cache().await
    }
}

// ===== Events =====

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<SettingsEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<SettingsEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: SettingsEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: SettingsEvent) -> anyhow::Result<()> {
        anyhow::bail!("bus closed")
    }
}

// ===== Notifications =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: RwLock<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.read().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.seen
            .read()
            .iter()
            .filter_map(|n| match n {
                Notification::Success(m) => Some(m.clone()),
                Notification::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .read()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(m) => Some(m.clone()),
                Notification::Success(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.seen.write().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.seen
            .write()
            .push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.seen.write().push(Notification::Error(message.to_string()));
    }
}

// ===== Export =====

#[derive(Default)]
pub struct MemoryExportSink {
    files: Mutex<Vec<(String, String)>>,
}

impl MemoryExportSink {
    pub fn files(&self) -> Vec<(String, String)> {
        self.files.lock().clone()
    }
}

#[async_trait]
impl ExportSink for MemoryExportSink {
    async fn deliver(&self, file_name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        self.files
            .lock()
            .push((file_name.to_string(), contents.to_string()));
        Ok(PathBuf::from(file_name))
    }
}
