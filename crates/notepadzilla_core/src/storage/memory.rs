//! In-process stores: a volatile map and an always-failing placeholder.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Volatile key-value store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store used when the persistent backend could not be opened.
///
/// Every call fails fast with `StorageError::Unavailable`.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StorageError {
        StorageError::Unavailable(self.reason.clone())
    }
}

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(self.error())
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(self.error())
    }

    fn delete(&self, _key: &str) -> StorageResult<()> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryKeyValueStore, UnavailableStore};
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn memory_store_roundtrips_values() {
        let store = MemoryKeyValueStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.len(), 1);
        store.delete("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = UnavailableStore::new("disabled");
        assert!(matches!(store.get("a"), Err(StorageError::Unavailable(_))));
        assert!(matches!(
            store.set("a", "1"),
            Err(StorageError::Unavailable(_))
        ));
    }
}
