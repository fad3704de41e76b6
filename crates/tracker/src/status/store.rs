use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::model::{Character, Identified};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
    #[error("document id '{id}' is not a valid store key")]
    InvalidId { id: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path} at {json_path}: {message}")]
    Decode {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("failed to encode document '{id}': {message}")]
    Encode { id: String, message: String },
}

/// Live-entity repository for one entity kind.
pub trait EntityStore<T>: Send + Sync {
    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;
    fn update(&self, entity: &T) -> Result<(), StoreError>;
}

/// Snapshot repository for one entity or marker kind. At most one snapshot
/// exists per id; `save` replaces any prior snapshot unconditionally.
pub trait SnapshotStore<T>: Send + Sync {
    fn save(&self, value: &T) -> Result<(), StoreError>;
    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;
}

/// Character repository with the extra name lookup used for notification
/// text. Missing ids are skipped rather than reported.
pub trait CharacterStore: EntityStore<Character> {
    fn resolve_display_names(&self, ids: &[String]) -> Result<Vec<String>, StoreError>;
}

// Shared handles count as stores, so a caller can keep a handle to a store
// it hands to the tracker.
impl<T, S: EntityStore<T> + ?Sized> EntityStore<T> for Arc<S> {
    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        (**self).get_by_id(id)
    }

    fn update(&self, entity: &T) -> Result<(), StoreError> {
        (**self).update(entity)
    }
}

impl<T, S: SnapshotStore<T> + ?Sized> SnapshotStore<T> for Arc<S> {
    fn save(&self, value: &T) -> Result<(), StoreError> {
        (**self).save(value)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        (**self).get_by_id(id)
    }
}

impl<S: CharacterStore + ?Sized> CharacterStore for Arc<S> {
    fn resolve_display_names(&self, ids: &[String]) -> Result<Vec<String>, StoreError> {
        (**self).resolve_display_names(ids)
    }
}

/// Mutex-guarded in-memory store. One instance per entity kind and per
/// marker kind; instances are never shared across kinds.
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: Mutex<HashMap<String, T>>,
}

impl<T: Identified + Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, value: T) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(value.id().to_string(), value);
        Ok(())
    }
}

impl<T: Identified + Clone + Send> EntityStore<T> for MemoryStore<T> {
    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(id).cloned())
    }

    fn update(&self, entity: &T) -> Result<(), StoreError> {
        self.insert(entity.clone())
    }
}

impl<T: Identified + Clone + Send> SnapshotStore<T> for MemoryStore<T> {
    fn save(&self, value: &T) -> Result<(), StoreError> {
        self.insert(value.clone())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(id).cloned())
    }
}

impl CharacterStore for MemoryStore<Character> {
    fn resolve_display_names(&self, ids: &[String]) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| entries.get(id).map(|character| character.name.clone()))
            .collect())
    }
}
