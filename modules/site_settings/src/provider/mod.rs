//! Settings provider - process-wide cache in front of the settings API
//!
//! Reads are served from the cache. Mutations go through the API and, once
//! confirmed, the cache is replaced with the canonical value from the
//! service. Other providers' commits arrive over the event bus and replace
//! the cache directly.

pub mod export;
pub mod notify;

use crate::contract::{
    CategoryPatch, CategorySettings, SettingsAction, SettingsCategory, SettingsError,
    SettingsSnapshot, SiteSettings, SiteSettingsApi, SiteSettingsPatch, UpdateOutcome,
    ValidationResult,
};
use crate::domain::defaults::default_site_settings;
use crate::domain::events::SettingsEvent;
use crate::domain::path::get_setting_by_path;
use crate::infra::events::SettingsEventBus;
use export::{export_file_name, ExportSink};
use notify::Notifier;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Provider lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Uninitialized,
    Loading,
    Ready,
    Disposed,
}

/// Whether a mutation is currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Submitting,
}

/// Result of a provider mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Persisted; the cache now holds this revision
    Committed { revision: u64 },
    /// Validation failed; nothing was persisted
    Rejected(ValidationResult),
    /// The operation could not run to validation or persistence failed
    Failed(SettingsError),
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Rejected(validation) => Some(validation),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SettingsError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Decrements the in-flight counter when the mutation finishes
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct SettingsProvider {
    api: Arc<dyn SiteSettingsApi>,
    notifier: Arc<dyn Notifier>,
    export_sink: Option<Arc<dyn ExportSink>>,
    event_bus: Option<SettingsEventBus>,
    cache: Arc<watch::Sender<SettingsSnapshot>>,
    state: Mutex<ProviderState>,
    /// Held for the whole of `init` so concurrent callers wait for one load
    init_lock: tokio::sync::Mutex<()>,
    in_flight: AtomicUsize,
    cancel: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SettingsProvider {
    pub fn new(api: Arc<dyn SiteSettingsApi>, notifier: Arc<dyn Notifier>) -> Self {
        let (cache, _) = watch::channel(SettingsSnapshot {
            revision: 0,
            settings: default_site_settings(),
        });
        Self {
            api,
            notifier,
            export_sink: None,
            event_bus: None,
            cache: Arc::new(cache),
            state: Mutex::new(ProviderState::Uninitialized),
            init_lock: tokio::sync::Mutex::new(()),
            in_flight: AtomicUsize::new(0),
            cancel: CancellationToken::new(),
            listener: Mutex::new(None),
        }
    }

    /// Follow commits made through other providers
    pub fn with_event_bus(mut self, bus: SettingsEventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn with_export_sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.export_sink = Some(sink);
        self
    }

    // ===== Lifecycle =====

    /// Load settings and start following the event bus
    ///
    /// Calling `init` on a ready provider is a no-op. A call made while
    /// another `init` is loading waits for that load and then returns its
    /// state. On failure the cache keeps its previous value and the provider
    /// returns to `Uninitialized`.
    pub async fn init(&self) -> Result<(), SettingsError> {
        let _init = self.init_lock.lock().await;
        {
            let mut state = self.state.lock();
            match *state {
                ProviderState::Ready => return Ok(()),
                ProviderState::Disposed => return Err(SettingsError::Internal),
                // Loading under the lock means an earlier init was dropped mid-load
                ProviderState::Uninitialized | ProviderState::Loading => {
                    *state = ProviderState::Loading
                }
            }
        }

        // Subscribe before loading so no commit falls between the two
        let receiver = self.event_bus.as_ref().map(SettingsEventBus::subscribe);

        match self.api.get_snapshot().await {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
            }
            Err(e) => {
                self.notifier
                    .error(&format!("Failed to load settings: {}", e));
                *self.state.lock() = ProviderState::Uninitialized;
                return Err(e);
            }
        }

        if let Some(receiver) = receiver {
            let handle = tokio::spawn(listen(
                receiver,
                self.cache.clone(),
                self.api.clone(),
                self.cancel.clone(),
            ));
            *self.listener.lock() = Some(handle);
        }

        *self.state.lock() = ProviderState::Ready;
        info!(revision = self.revision(), "Settings provider ready");
        Ok(())
    }

    /// Stop following the event bus; the cache stays readable
    pub async fn dispose(&self) {
        self.cancel.cancel();
        let handle = self.listener.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Settings listener task failed");
            }
        }
        *self.state.lock() = ProviderState::Disposed;
        debug!("Settings provider disposed");
    }

    pub fn state(&self) -> ProviderState {
        *self.state.lock()
    }

    pub fn loading(&self) -> bool {
        self.state() == ProviderState::Loading
    }

    pub fn mutation_state(&self) -> MutationState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            MutationState::Submitting
        } else {
            MutationState::Idle
        }
    }

    // ===== Reads (cache only) =====

    pub fn settings(&self) -> SiteSettings {
        self.cache.borrow().settings.clone()
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        self.cache.borrow().clone()
    }

    pub fn revision(&self) -> u64 {
        self.cache.borrow().revision
    }

    pub fn get_setting(&self, path: &str) -> Option<serde_json::Value> {
        get_setting_by_path(&self.cache.borrow().settings, path)
    }

    pub fn get_category_settings(&self, category: SettingsCategory) -> CategorySettings {
        self.cache.borrow().settings.category(category)
    }

    /// Receiver that observes every cache replacement
    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.cache.subscribe()
    }

    // ===== Mutations =====

    pub async fn update_setting(&self, path: &str, value: serde_json::Value) -> MutationOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let result = self.api.update_setting(path, value).await;
        self.finish(result, "Setting updated").await
    }

    pub async fn update_settings(&self, patch: SiteSettingsPatch) -> MutationOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let result = self.api.update_settings(patch).await;
        self.finish(result, "Settings updated").await
    }

    pub async fn update_category_settings(&self, patch: CategoryPatch) -> MutationOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let message = format!("{} settings updated", patch.category());
        let result = self.api.update_category_settings(patch).await;
        self.finish(result, &message).await
    }

    pub async fn dispatch(&self, action: SettingsAction) -> MutationOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let message = match &action {
            SettingsAction::ResetToDefaults => "Settings reset to defaults",
            SettingsAction::ImportSettings(_) => "Settings imported",
            _ => "Settings updated",
        };
        let result = self.api.dispatch(action).await;
        self.finish(result, message).await
    }

    pub async fn reset_to_defaults(&self) -> MutationOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let result = self.api.reset_to_defaults().await;
        self.finish(result, "Settings reset to defaults").await
    }

    /// Import a raw JSON document (export envelope or bare settings)
    pub async fn import_settings(&self, raw: &str) -> MutationOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let result = self.api.import_settings(raw).await;
        self.finish(result, "Settings imported").await
    }

    // ===== Export / refresh =====

    /// Pretty-printed export document, also handed to the export sink
    ///
    /// A sink failure is reported through the notifier; the document is
    /// still returned.
    pub async fn export_settings(&self) -> Result<String, SettingsError> {
        let export = match self.api.export_settings().await {
            Ok(export) => export,
            Err(e) => {
                self.notifier
                    .error(&format!("Failed to export settings: {}", e));
                return Err(e);
            }
        };

        let file_name = export_file_name(export.timestamp.date_naive());
        let json = serde_json::to_string_pretty(&export).map_err(|e| {
            warn!(error = %e, "Failed to serialize settings export");
            SettingsError::Internal
        })?;

        match &self.export_sink {
            Some(sink) => match sink.deliver(&file_name, &json).await {
                Ok(path) => {
                    debug!(path = %path.display(), "Export delivered");
                    self.notifier.success("Settings exported");
                }
                Err(e) => {
                    warn!(error = %e, file_name = %file_name, "Export delivery failed");
                    self.notifier
                        .error(&format!("Failed to save {}: {}", file_name, e));
                }
            },
            None => self.notifier.success("Settings exported"),
        }

        Ok(json)
    }

    /// Drop the service memo and reload the cache
    pub async fn refresh_settings(&self) -> Result<(), SettingsError> {
        self.api.clear_cache().await;
        let snapshot = self.api.get_snapshot().await?;
        self.cache.send_replace(snapshot);
        debug!(revision = self.revision(), "Settings refreshed");
        Ok(())
    }

    // ===== Helper Methods =====

    /// Replace the cache unless it already holds a newer revision
    fn apply_snapshot(&self, snapshot: SettingsSnapshot) -> bool {
        apply_if_current(&self.cache, snapshot)
    }

    async fn finish(
        &self,
        result: Result<UpdateOutcome, SettingsError>,
        success_message: &str,
    ) -> MutationOutcome {
        match result {
            Ok(outcome) if outcome.success => match self.api.get_snapshot().await {
                Ok(snapshot) => {
                    let revision = snapshot.revision;
                    self.apply_snapshot(snapshot);
                    for (path, warnings) in &outcome.validation.warnings {
                        for warning in warnings {
                            debug!(path = %path, warning = %warning, "Committed with warning");
                        }
                    }
                    self.notifier.success(success_message);
                    MutationOutcome::Committed { revision }
                }
                Err(e) => {
                    self.notifier
                        .error(&format!("Settings saved but could not be reloaded: {}", e));
                    MutationOutcome::Failed(e)
                }
            },
            Ok(outcome) => {
                for message in outcome.validation.error_messages() {
                    self.notifier.error(&message);
                }
                MutationOutcome::Rejected(outcome.validation)
            }
            Err(SettingsError::Parse { details }) => {
                self.notifier
                    .error(&format!("Import file is not valid JSON: {}", details));
                MutationOutcome::Failed(SettingsError::Parse { details })
            }
            Err(e @ SettingsError::Conflict { .. }) => {
                self.notifier
                    .error("Settings were changed elsewhere; reloaded the latest version");
                if let Err(refresh_err) = self.refresh_settings().await {
                    warn!(error = %refresh_err, "Refresh after conflict failed");
                }
                MutationOutcome::Failed(e)
            }
            Err(e) => {
                self.notifier
                    .error(&format!("Failed to save settings: {}", e));
                MutationOutcome::Failed(e)
            }
        }
    }
}

impl Drop for SettingsProvider {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn apply_if_current(cache: &watch::Sender<SettingsSnapshot>, snapshot: SettingsSnapshot) -> bool {
    cache.send_if_modified(|current| {
        if snapshot.revision >= current.revision && *current != snapshot {
            *current = snapshot;
            true
        } else {
            false
        }
    })
}

async fn listen(
    mut receiver: broadcast::Receiver<SettingsEvent>,
    cache: Arc<watch::Sender<SettingsSnapshot>>,
    api: Arc<dyn SiteSettingsApi>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = receiver.recv() => match received {
                Ok(event) => {
                    if apply_if_current(&cache, event.snapshot()) {
                        debug!(revision = event.revision, change = ?event.change, "Applied settings event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Settings listener lagged, reloading");
                    match api.get_snapshot().await {
                        Ok(snapshot) => {
                            apply_if_current(&cache, snapshot);
                        }
                        Err(e) => warn!(error = %e, "Reload after lag failed"),
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    debug!("Settings listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_older_snapshot_is_ignored() {
        let (cache, _) = watch::channel(SettingsSnapshot {
            revision: 5,
            settings: default_site_settings(),
        });

        let mut stale = default_site_settings();
        stale.general.site_identity.site_title = "Stale".to_string();
        assert!(!apply_if_current(
            &cache,
            SettingsSnapshot {
                revision: 4,
                settings: stale,
            }
        ));

        let mut fresh = default_site_settings();
        fresh.general.site_identity.site_title = "Fresh".to_string();
        assert!(apply_if_current(
            &cache,
            SettingsSnapshot {
                revision: 5,
                settings: fresh,
            }
        ));
        assert_eq!(cache.borrow().settings.general.site_identity.site_title, "Fresh");
    }

    #[test]
    fn test_outcome_accessors() {
        let committed = MutationOutcome::Committed { revision: 2 };
        assert!(committed.is_committed());
        assert!(committed.validation().is_none());

        let mut validation = ValidationResult::new();
        validation.add_error("general.siteIdentity.siteTitle", "Site title is required");
        let rejected = MutationOutcome::Rejected(validation);
        assert!(rejected.validation().is_some());

        let failed = MutationOutcome::Failed(SettingsError::Internal);
        assert_eq!(failed.error(), Some(&SettingsError::Internal));
    }
}
