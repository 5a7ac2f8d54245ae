//! In-memory implementation of [`KeyValueStore`].
//!
//! Nothing survives the process. Used by tests and by hosts that want an ephemeral session.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StoreError, StoreResult};

/// Key-value store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Returns the number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| StoreError::Backend("mutex poisoned".to_string()))
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        self.lock()?.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: String) -> StoreResult<()> {
        self.lock()?.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("a".to_string()).unwrap(), None);

        store.set("a".to_string(), "1".to_string()).unwrap();
        store.set("a".to_string(), "2".to_string()).unwrap();
        assert_eq!(store.get("a".to_string()).unwrap().as_deref(), Some("2"));
        assert_eq!(store.len().unwrap(), 1);

        store.remove("a".to_string()).unwrap();
        store.remove("missing".to_string()).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_with_entries() {
        let store = InMemoryKeyValueStore::with_entries([("k", "v")]);
        assert_eq!(store.get("k".to_string()).unwrap().as_deref(), Some("v"));
    }
}
