//! Persistent key-value store.
//!
//! The browser local-storage analog: namespaced text keys holding
//! JSON-encoded values. Managers depend on the [`KeyValueStore`] trait so
//! tests inject [`MemoryStore`] while production uses the file-backed
//! [`FileStore`].
//!
//! A corrupt stored value is never an error at this boundary - it is logged
//! and read back as absent, exactly like a cache miss.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys, one slice per manager. No manager reads another's key.
pub mod keys {
    /// Cart entries, a JSON array.
    pub const CART: &str = "kisan_setu.cart";
    /// The saved location record.
    pub const LOCATION: &str = "kisan_setu.location";
    /// Whether the user confirmed a location (JSON boolean).
    pub const LOCATION_ENABLED: &str = "kisan_setu.location_enabled";
    /// The logged-in session record.
    pub const SESSION: &str = "kisan_setu.session";
}

/// Errors from the storage backend itself.
///
/// Corrupt *values* never surface here; only the backend being unable to
/// read or write at all does.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is not usable at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A value could not be serialized for writing.
    #[error("value serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw text key-value storage.
///
/// Same-instance ordering is guaranteed: a `write` completes before it
/// returns, so an immediately following `read` observes the new value.
/// Nothing is guaranteed across instances - two stores over the same file
/// race like two browser tabs, last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw text stored under `key`, or `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed JSON access on top of any [`KeyValueStore`].
pub trait StoreExt: KeyValueStore {
    /// Read and decode the value under `key`.
    ///
    /// Malformed stored text is logged and treated as absent, never an
    /// error.
    ///
    /// # Errors
    ///
    /// Only if the backend itself is unavailable.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.read(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt stored value, treating as absent");
                Ok(None)
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// If the value cannot be serialized or the backend cannot be written.
    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.write(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_roundtrip() {
        let store = MemoryStore::new();
        let value = json!({"a": 1, "b": ["x", "y"]});
        store.write_json("k", &value).unwrap();
        let back: serde_json::Value = store.read_json("k").unwrap().unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_read_unwritten_key_is_absent() {
        let store = MemoryStore::new();
        let got: Option<serde_json::Value> = store.read_json("never").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.write("k", "{not json at all").unwrap();
        let got: Option<serde_json::Value> = store.read_json("k").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = MemoryStore::new();
        store.write("k", "1").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }
}
