use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

/// Storage key holding the project collection
pub const PROJECTS_KEY: &str = "task-tree-projects";
/// Storage key holding the task collection
pub const TASKS_KEY: &str = "task-tree-tasks";

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {key}: {source}")]
    Read { key: String, source: io::Error },
    #[error("could not write {key}: {source}")]
    Write { key: String, source: io::Error },
    #[error("{key} is not a valid JSON array: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },
    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// String key-value storage, one value per collection.
///
/// Implementations are synchronous: a successful `set` is durable before it
/// returns.
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Read a whole collection. A missing key is an empty collection.
pub fn read_collection<T, S>(store: &S, key: &str) -> Result<Vec<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
            key: key.to_string(),
            source,
        }),
    }
}

/// Replace a whole collection.
pub fn write_collection<T, S>(store: &S, key: &str, items: &[T]) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(items).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Persists each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        atomic_write(&self.path_for(key), value.as_bytes()).map_err(write_err)?;
        log::debug!("event=storage_write key={} bytes={}", key, value.len());
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Keeps values in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.get(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_creates_directory_and_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("nested/data"));
        store.set(PROJECTS_KEY, "[1,2,3]").unwrap();
        assert_eq!(store.get(PROJECTS_KEY).unwrap().as_deref(), Some("[1,2,3]"));
        assert!(tmp.path().join("nested/data/task-tree-projects.json").exists());
    }

    #[test]
    fn read_collection_defaults_to_empty() {
        let store = MemoryStore::new();
        let items: Vec<u32> = read_collection(&store, TASKS_KEY).unwrap();
        assert!(items.is_empty());

        store.set(TASKS_KEY, "   ").unwrap();
        let items: Vec<u32> = read_collection(&store, TASKS_KEY).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn read_collection_reports_malformed_json() {
        let store = MemoryStore::new();
        store.set(TASKS_KEY, "{not json").unwrap();
        let err = read_collection::<u32, _>(&store, TASKS_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Parse { ref key, .. } if key == TASKS_KEY));
        assert!(err.to_string().contains(TASKS_KEY));
    }

    #[test]
    fn write_then_read_collection() {
        let store = MemoryStore::new();
        write_collection(&store, PROJECTS_KEY, &["a".to_string(), "b".to_string()]).unwrap();
        let back: Vec<String> = read_collection(&store, PROJECTS_KEY).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }
}
