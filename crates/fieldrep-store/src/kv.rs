//! The key-value store interface and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StoreError;

/// A string key-value store.
///
/// Keys are opaque strings; callers namespace them (`auth:token`,
/// `fieldrep:daily-plan:doctors`, ...). There is no locking or transaction
/// discipline: concurrent writers to the same key simply overwrite each
/// other and the last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a key-value pair, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove several keys. Missing keys are skipped.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

// Compile-time assertion: KeyValueStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn KeyValueStore) {}
};

/// Process-local store backed by a sorted map.
///
/// Used by tests and by callers that do not need anything to survive the
/// process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.lock();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = MemoryStore::new();
        store.set("auth:token", "abc").await.unwrap();
        assert_eq!(store.get("auth:token").await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = MemoryStore::new();
        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.remove("never-set").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn remove_many_only_touches_listed_keys() {
        let store = MemoryStore::new();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        store.remove_many(&["a", "c", "zzz"]).await.unwrap();

        assert_eq!(store.keys(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("x", "y").await.unwrap();
        assert_eq!(store.get("x").await.unwrap().as_deref(), Some("y"));
    }
}
