//! Infrastructure layer - storage backends, event bus and export files

pub mod events;
pub mod export;
pub mod storage;

pub use events::SettingsEventBus;
pub use export::FileExportSink;
