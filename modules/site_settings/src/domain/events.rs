//! Domain events for site settings
//!
//! One event is published after every committed mutation. It carries the
//! full new settings so that listeners (other provider instances) can
//! replace their cache without asking the service again.

use crate::contract::{SettingsSnapshot, SiteSettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of mutation produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsChange {
    /// Path, category or action-driven update
    Updated,
    /// Replaced with the defaults
    Reset,
    /// Replaced with an imported snapshot
    Imported,
}

/// Settings changed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsEvent {
    /// Unique event identifier
    pub event_id: Uuid,
    pub change: SettingsChange,
    /// Revision the settings were persisted at
    pub revision: u64,
    /// Full settings after the change
    pub settings: SiteSettings,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
}

impl SettingsEvent {
    /// Create an event for a committed snapshot
    pub fn new(change: SettingsChange, snapshot: &SettingsSnapshot) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            change,
            revision: snapshot.revision,
            settings: snapshot.settings.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            revision: self.revision,
            settings: self.settings.clone(),
        }
    }
}

/// Event publisher trait for settings change notifications
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a change event; errors are reported, never retried here
    async fn publish(&self, event: SettingsEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when broadcasting is disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: SettingsEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
