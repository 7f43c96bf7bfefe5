use std::collections::BTreeMap;

use thiserror::Error;

use hbnb_core::{DomainError, Entity, EntityId, EntityKind, FieldType, composite_key};

/// Live entities keyed by composite key (`Type.id`).
///
/// The map is sorted for stable output, but the contract makes no ordering
/// promise: callers must not rely on it.
pub type EntityMap = BTreeMap<String, Entity>;

/// Storage operation error.
///
/// These are **infrastructure errors** (durable state, connectivity) as
/// opposed to domain errors (unknown types, bad attribute values), which are
/// wrapped in `Domain` when they surface through a storage call.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The durable state exists but cannot be parsed back into entities.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The backend cannot be reached (connection refused, session closed).
    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("io error during {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl StorageError {
    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        Self::Io { operation, source }
    }
}

/// Uniform persistence contract for every backend.
///
/// ## Semantics
///
/// - `upsert()` registers a new entity or stages a changed one. It is not
///   durable until `commit()`.
/// - `commit()` makes every staged upsert/delete durable.
/// - `delete()` removes an entity from the live set. Whether it is durable
///   immediately is backend-specific (the file backend flushes synchronously).
/// - `reload()` rebuilds the live set from durable state, discarding anything
///   staged but not committed.
/// - `close()` releases backend resources.
///
/// Entities returned by `all()` are owned snapshots. They go stale after a
/// `delete()` or `reload()` of the same key.
///
/// Implementations must give identical results for the same sequence of
/// calls, regardless of where the state is kept.
pub trait Storage {
    /// Every live entity, optionally restricted to one type.
    fn all(&self, kind: Option<EntityKind>) -> Result<EntityMap, StorageError>;

    fn upsert(&mut self, entity: Entity) -> Result<(), StorageError>;

    fn commit(&mut self) -> Result<(), StorageError>;

    fn delete(&mut self, entity: &Entity) -> Result<(), StorageError>;

    fn reload(&mut self) -> Result<(), StorageError>;

    fn close(&mut self) -> Result<(), StorageError>;

    /// Look up one entity by type and id.
    fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Entity>, StorageError> {
        let key = composite_key(kind, id);
        Ok(self.all(Some(kind))?.remove(&key))
    }

    /// Every live entity of `kind` whose text attribute `field` equals `value`.
    ///
    /// `field` must be a declared text attribute of `kind`.
    fn find_by_foreign_key(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> Result<Vec<Entity>, StorageError> {
        match kind.schema().field(field) {
            Some(spec) if spec.ty == FieldType::Text => {}
            _ => return Err(DomainError::invalid_attribute(kind, field).into()),
        }
        Ok(self
            .all(Some(kind))?
            .into_values()
            .filter(|e| e.text(field) == Some(value))
            .collect())
    }
}

impl<S> Storage for Box<S>
where
    S: Storage + ?Sized,
{
    fn all(&self, kind: Option<EntityKind>) -> Result<EntityMap, StorageError> {
        (**self).all(kind)
    }

    fn upsert(&mut self, entity: Entity) -> Result<(), StorageError> {
        (**self).upsert(entity)
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        (**self).commit()
    }

    fn delete(&mut self, entity: &Entity) -> Result<(), StorageError> {
        (**self).delete(entity)
    }

    fn reload(&mut self) -> Result<(), StorageError> {
        (**self).reload()
    }

    fn close(&mut self) -> Result<(), StorageError> {
        (**self).close()
    }

    fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Entity>, StorageError> {
        (**self).get(kind, id)
    }

    fn find_by_foreign_key(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> Result<Vec<Entity>, StorageError> {
        (**self).find_by_foreign_key(kind, field, value)
    }
}
