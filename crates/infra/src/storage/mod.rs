//! Storage engine boundary.
//!
//! One contract (`Storage`) with two interchangeable backends. The backend is
//! chosen once at startup from configuration; nothing above this module
//! branches on which one is active.

pub mod file;
pub mod postgres;
pub mod relations;
pub mod r#trait;

pub use file::FileStorage;
pub use postgres::{PostgresStorage, SchemaMode};
pub use r#trait::{EntityMap, Storage, StorageError};

use crate::config::{Environment, StorageBackend, StorageConfig};

/// Construct the configured backend.
///
/// The returned store has not been reloaded yet; callers decide how to treat
/// a `DataCorruption` from the first `reload()`. A database that cannot be
/// reached is `BackendUnavailable`.
pub fn open_storage(config: &StorageConfig) -> Result<Box<dyn Storage>, StorageError> {
    match config.backend {
        StorageBackend::File => {
            tracing::info!(path = %config.file_path.display(), "using file storage");
            Ok(Box::new(FileStorage::new(config.file_path.clone())))
        }
        StorageBackend::Database => {
            let mode = match config.environment {
                Environment::Test => SchemaMode::Ephemeral,
                Environment::Dev => SchemaMode::Persistent,
            };
            Ok(Box::new(PostgresStorage::connect(&config.database_url, mode)?))
        }
    }
}
