//! In-process broadcast bus for settings events

use crate::domain::events::{EventPublisher, SettingsEvent};
use async_trait::async_trait;
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Fan-out of committed changes to every subscribed provider
#[derive(Clone)]
pub struct SettingsEventBus {
    sender: broadcast::Sender<SettingsEvent>,
}

impl SettingsEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SettingsEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for SettingsEventBus {
    async fn publish(&self, event: SettingsEvent) -> anyhow::Result<()> {
        let revision = event.revision;
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(revision, receivers, "Settings event broadcast");
            }
            Err(_) => {
                tracing::trace!(revision, "No settings listeners");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::SettingsSnapshot;
    use crate::domain::defaults::default_site_settings;
    use crate::domain::events::SettingsChange;

    fn event(revision: u64) -> SettingsEvent {
        SettingsEvent::new(
            SettingsChange::Updated,
            &SettingsSnapshot {
                revision,
                settings: default_site_settings(),
            },
        )
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = SettingsEventBus::default();
        assert!(bus.publish(event(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = SettingsEventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(event(4)).await.unwrap();

        assert_eq!(a.recv().await.unwrap().revision, 4);
        assert_eq!(b.recv().await.unwrap().revision, 4);
    }
}
