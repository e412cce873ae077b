//! Configuration for the site settings module

use anyhow::Context;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "SITE_SETTINGS_";

/// Where the settings document is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process memory only, lost on restart
    #[default]
    Memory,
    /// Single JSON file
    File { path: PathBuf },
    /// SeaORM connection URL (`sqlite://...`, `postgres://...`)
    Database { url: String },
}

/// Site settings configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    /// Directory exports are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Buffered events per subscriber before it lags
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Recorded as `metadata.exportedBy`
    #[serde(default = "default_exported_by")]
    pub exported_by: String,

    /// Maximum serialized settings size in bytes
    #[serde(default = "default_max_data_size")]
    pub max_data_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            export_dir: default_export_dir(),
            event_channel_capacity: default_event_channel_capacity(),
            exported_by: default_exported_by(),
            max_data_size: default_max_data_size(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (if given and present), then environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid site settings configuration")
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_event_channel_capacity() -> usize {
    64
}

fn default_exported_by() -> String {
    "admin".to_string()
}

fn default_max_data_size() -> usize {
    1024 * 1024 // 1MB
}
