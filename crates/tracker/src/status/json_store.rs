use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{Character, Identified};

use super::store::{CharacterStore, EntityStore, SnapshotStore, StoreError};

/// One JSON document per id under `<root>/<collection>/<id>.json`. Writes
/// replace the document atomically (temp file, then rename), so a crashed
/// write never leaves a half-written document behind. Serves as both entity
/// store and snapshot store; distinct collections keep kinds isolated.
#[derive(Debug)]
pub struct JsonStore<T> {
    dir: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Identified + Serialize + DeserializeOwned,
{
    pub fn new(root: &Path, collection: &str) -> Self {
        Self {
            dir: root.join(collection),
            _marker: PhantomData,
        }
    }

    fn document_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(StoreError::InvalidId { id: id.to_string() });
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn read_document(&self, id: &str) -> Result<Option<T>, StoreError> {
        let path = self.document_path(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
            Ok(value) => Ok(Some(value)),
            Err(error) => Err(StoreError::Decode {
                path,
                json_path: error.path().to_string(),
                message: error.inner().to_string(),
            }),
        }
    }

    fn write_document(&self, value: &T) -> Result<(), StoreError> {
        let path = self.document_path(value.id())?;
        let text = serde_json::to_string_pretty(value).map_err(|error| StoreError::Encode {
            id: value.id().to_string(),
            message: error.to_string(),
        })?;
        write_text_atomic(&path, &text).map_err(|source| StoreError::Write { path, source })
    }
}

impl<T> EntityStore<T> for JsonStore<T>
where
    T: Identified + Serialize + DeserializeOwned + Send + Sync,
{
    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.read_document(id)
    }

    fn update(&self, entity: &T) -> Result<(), StoreError> {
        self.write_document(entity)
    }
}

impl<T> SnapshotStore<T> for JsonStore<T>
where
    T: Identified + Serialize + DeserializeOwned + Send + Sync,
{
    fn save(&self, value: &T) -> Result<(), StoreError> {
        self.write_document(value)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.read_document(id)
    }
}

impl CharacterStore for JsonStore<Character> {
    fn resolve_display_names(&self, ids: &[String]) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for id in ids {
            if let Some(character) = self.read_document(id)? {
                names.push(character.name);
            }
        }
        Ok(names)
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text.as_bytes())?;
    replace_file(&tmp_path, path)
}

fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    match fs::remove_file(final_path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(tmp_path);
            return Err(error);
        }
    }

    if let Err(error) = fs::rename(tmp_path, final_path) {
        let _ = fs::remove_file(tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.tmp");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}
