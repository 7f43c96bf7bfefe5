//! Serialized-file storage backend.
//!
//! Keeps every live entity in memory and mirrors the whole set into a single
//! JSON document on commit:
//!
//! ```json
//! { "State.4f1c…": { "id": "4f1c…", "created_at": "…", "updated_at": "…",
//!                    "name": "Nevada", "__class__": "State" } }
//! ```
//!
//! Writes go to a sibling temp file which is fsynced and renamed over the
//! backing file, so a crash mid-commit leaves the previous version intact.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

use hbnb_core::{Entity, EntityKind};

use super::r#trait::{EntityMap, Storage, StorageError};

/// File-backed store. The in-memory map is the sole source of truth between
/// `reload()` calls.
///
/// `committed` mirrors the last document written (or read). A failed write
/// rolls the live set back to it, so nothing from a failed command reaches
/// a later commit.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    objects: EntityMap,
    committed: EntityMap,
}

impl FileStorage {
    /// Create a store bound to `path`. The live set starts empty; call
    /// `reload()` to read the backing file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: EntityMap::new(),
            committed: EntityMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io("create_dir", e))?;
        }
        let temp_path = self.path.with_extension("tmp");
        let temp_file = File::create(&temp_path).map_err(|e| StorageError::io("create_temp", e))?;
        let mut writer = BufWriter::new(temp_file);
        writer
            .write_all(bytes)
            .map_err(|e| StorageError::io("write_temp", e))?;
        writer.flush().map_err(|e| StorageError::io("flush_temp", e))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| StorageError::io("sync_temp", e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::io("rename", e))?;
        Ok(())
    }
}

/// Parse a backing file into entities.
///
/// All-or-nothing: any malformed record rejects the whole document.
fn parse_document(text: &str) -> Result<EntityMap, String> {
    let doc: JsonValue = serde_json::from_str(text).map_err(|e| format!("invalid json: {e}"))?;
    let records = doc
        .as_object()
        .ok_or_else(|| "top-level value is not an object".to_string())?;

    let mut objects = EntityMap::new();
    for (key, record) in records {
        let record = record
            .as_object()
            .ok_or_else(|| format!("{key}: record is not an object"))?;
        let entity = Entity::from_record(record).map_err(|e| format!("{key}: {e}"))?;
        if entity.key() != *key {
            return Err(format!(
                "{key}: key does not match record identity {}",
                entity.key()
            ));
        }
        objects.insert(key.clone(), entity);
    }
    Ok(objects)
}

impl Storage for FileStorage {
    fn all(&self, kind: Option<EntityKind>) -> Result<EntityMap, StorageError> {
        Ok(match kind {
            None => self.objects.clone(),
            Some(kind) => self
                .objects
                .iter()
                .filter(|(_, e)| e.kind() == kind)
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect(),
        })
    }

    fn upsert(&mut self, entity: Entity) -> Result<(), StorageError> {
        self.objects.insert(entity.key(), entity);
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display(), objects = self.objects.len()), err)]
    fn commit(&mut self) -> Result<(), StorageError> {
        let document: Map<String, JsonValue> = self
            .objects
            .iter()
            .map(|(key, e)| (key.clone(), JsonValue::Object(e.to_record())))
            .collect();
        let written = serde_json::to_vec(&JsonValue::Object(document))
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|bytes| self.write_atomically(&bytes));
        if let Err(err) = written {
            tracing::warn!(error = %err, "commit failed; discarding uncommitted changes");
            self.objects = self.committed.clone();
            return Err(err);
        }
        self.committed = self.objects.clone();
        tracing::debug!("file store committed");
        Ok(())
    }

    #[instrument(skip(self, entity), fields(key = %entity.key()), err)]
    fn delete(&mut self, entity: &Entity) -> Result<(), StorageError> {
        if self.objects.remove(&entity.key()).is_some() {
            // Flush now: a crash after delete must not resurrect the entity.
            self.commit()?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()), err)]
    fn reload(&mut self) -> Result<(), StorageError> {
        self.objects.clear();
        self.committed.clear();

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StorageError::io("read", e)),
        };
        if text.trim().is_empty() {
            return Ok(());
        }

        self.objects = parse_document(&text).map_err(|reason| {
            StorageError::DataCorruption(format!("{}: {reason}", self.path.display()))
        })?;
        self.committed = self.objects.clone();
        tracing::debug!(objects = self.objects.len(), "file store reloaded");
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        self.reload()
    }
}
