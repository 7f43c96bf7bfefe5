//! Infrastructure layer: storage backends and configuration.

pub mod config;
pub mod storage;

pub use config::{ConfigError, Environment, StorageBackend, StorageConfig};
pub use storage::{EntityMap, FileStorage, PostgresStorage, Storage, StorageError, open_storage};
