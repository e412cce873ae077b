//! Domain layer - schema defaults, path utilities, validation and the service

pub mod defaults;
pub mod events;
pub mod import;
pub mod path;
pub mod repository;
pub mod service;
pub mod validation;

pub use defaults::default_site_settings;
pub use events::{EventPublisher, NoOpEventPublisher, SettingsChange, SettingsEvent};
pub use path::{get_setting_by_path, set_setting_by_path, setting_paths};
pub use repository::{SettingsStore, StoreError, StoredSettings};
pub use service::{Service, ServiceOptions};
pub use validation::validate_settings;
