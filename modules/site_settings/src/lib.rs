//! Site Settings Module
//!
//! Typed configuration for the CMS: six settings categories with canonical
//! defaults, dot-path access, validation before every commit, versioned
//! JSON export/import and change broadcast to every live provider.
//! Writes use optimistic concurrency on a persisted revision counter.

// Public exports
pub mod contract;
pub use contract::{
    CategoryPatch, CategorySettings, SettingsAction, SettingsCategory, SettingsError,
    SettingsExport, SettingsSnapshot, SiteSettings, SiteSettingsApi, SiteSettingsPatch,
    UpdateOutcome, ValidationResult,
};

pub mod config;
pub use config::{Config, StorageConfig};

pub mod module;
pub use module::SiteSettingsModule;

pub mod provider;
pub use provider::{MutationOutcome, MutationState, ProviderState, SettingsProvider};

pub mod domain;
pub use domain::{
    default_site_settings, get_setting_by_path, set_setting_by_path, validate_settings,
};

pub mod api;
pub mod infra;
