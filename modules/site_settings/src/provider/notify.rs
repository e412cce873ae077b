//! User-facing notification surface

/// Receives the success and failure messages produced by provider mutations
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that writes every message to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "site_settings::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "site_settings::notify", "{}", message);
    }
}
