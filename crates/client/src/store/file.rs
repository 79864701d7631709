//! File-backed store: the production analog of browser local storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{KeyValueStore, StoreError};

/// A [`KeyValueStore`] persisted as a single JSON object file.
///
/// The file is loaded once at construction; reads are served from the
/// in-memory map and every write or remove rewrites the file before
/// returning. Like browser local storage, a second instance opened over the
/// same path does NOT observe this instance's later writes - there is no
/// cross-instance synchronization, and concurrent writers race with last
/// write winning.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store over `path`, loading any existing contents.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty - stored state is a cache, not a source of
    /// truth worth failing over.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = load(&path);
        Self {
            path,
            map: Mutex::new(map),
        }
    }

    fn persist(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, encoded)?;
        Ok(())
    }
}

fn load(path: &Path) -> HashMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "state file unreadable, starting empty");
            return HashMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "state file corrupt, starting empty");
            HashMap::new()
        }
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_owned(), value.to_owned());
        self.persist(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        self.persist(&map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path);
        store.write("k", "\"hello\"").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.read("k").unwrap().as_deref(), Some("\"hello\""));
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "garbage{{{").unwrap();

        let store = FileStore::open(&path);
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn test_no_cross_instance_sync() {
        // Two "tabs" over the same file: writes from one are invisible to
        // the other until it reopens. This is deliberately NOT guaranteed
        // to sync.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let tab_a = FileStore::open(&path);
        let tab_b = FileStore::open(&path);

        tab_a.write("k", "\"from-a\"").unwrap();
        assert!(tab_b.read("k").unwrap().is_none());
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path);
        store.write("k", "1").unwrap();
        store.remove("k").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert!(reopened.read("k").unwrap().is_none());
    }
}
