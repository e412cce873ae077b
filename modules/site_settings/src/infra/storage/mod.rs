//! Storage layer - settings store backends

pub mod entity;
pub mod file;
pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod repositories;

pub use file::FileSettingsStore;
pub use memory::InMemorySettingsStore;
pub use migrations::Migrator;
pub use repositories::SeaOrmSettingsStore;
