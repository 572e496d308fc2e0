//! Injectable key-value storage backing the session.
//!
//! The interface mirrors browser local storage: synchronous string gets and
//! sets under fixed keys. Two implementations ship with the client: an
//! in-memory store for tests and ephemeral sessions, and a write-through
//! JSON file store for native use where the session must survive restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Persistent key-value storage for session credentials.
///
/// Implementations must be safe to share across concurrently completing
/// requests; values are opaque strings owned by the [`super::SessionManager`].
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Delete the value stored under `key`. Removing an absent key is a
    /// no-op.
    fn remove(&self, key: &str);
}

/// Ephemeral in-memory store. The default for tests and short-lived clients.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Write-through store persisting the session as a JSON object in a file.
///
/// The native equivalent of browser local storage. Reads are served from an
/// in-memory map loaded once at open; every mutation rewrites the file. A
/// missing or corrupt file is treated as an empty session rather than an
/// error, matching the accessor contract that malformed stored state reads
/// as absent.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing session.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Corrupt session file, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    /// Rewrite the backing file from the current map. Persistence failures
    /// are logged, not propagated: the in-memory session stays usable.
    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(path = %self.path.display(), error = %e, "Failed to create session directory");
            return;
        }

        let serialized = match serde_json::to_string_pretty(entries) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(error = %e, "Failed to serialize session");
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), error = %e, "Failed to write session file");
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("token").is_none());

        store.set("token", "T1");
        assert_eq!(store.get("token").as_deref(), Some("T1"));

        store.set("token", "T2");
        assert_eq!(store.get("token").as_deref(), Some("T2"));

        store.remove("token");
        assert!(store.get("token").is_none());
        // Removing again is a no-op.
        store.remove("token");
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path);
        store.set("token", "T1");
        store.set("user", r#"{"id":"x"}"#);
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("token").as_deref(), Some("T1"));
        assert_eq!(reopened.get("user").as_deref(), Some(r#"{"id":"x"}"#));
    }

    #[test]
    fn test_file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{{{ not json").expect("write");

        let store = FileStore::open(&path);
        assert!(store.get("token").is_none());

        // And it recovers: writes land normally afterwards.
        store.set("token", "T1");
        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("token").as_deref(), Some("T1"));
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deeper").join("session.json");

        let store = FileStore::open(&path);
        store.set("token", "T1");
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path);
        store.set("token", "T1");
        store.remove("token");

        let reopened = FileStore::open(&path);
        assert!(reopened.get("token").is_none());
    }
}
