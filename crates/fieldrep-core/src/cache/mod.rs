//! TTL-bound reference-data cache over the key-value store.
//!
//! Values are stored as JSON envelopes `{ "data": ..., "writtenAt": <ms> }`
//! under `<namespace>:<key name>`. An entry older than the cache's TTL is
//! removed from the store the first time it is read. Read failures of any
//! kind degrade to a miss: callers cannot tell "expired", "corrupt" and
//! "never fetched" apart, and all three mean "go to the network".

pub mod clock;
pub mod keys;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fieldrep_store::{KeyValueStore, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::CacheKey;

/// TTL used for the plan wizard's reference data.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Namespace prefixed to every key written by this client.
pub const DEFAULT_NAMESPACE: &str = "fieldrep";

/// Why a stored entry could not be used. Logged, never surfaced.
#[derive(Debug, Error)]
pub enum CacheReadError {
    #[error("store read failed: {0}")]
    Store(#[from] StoreError),

    #[error("malformed cache envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry<T> {
    data: T,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    written_at: DateTime<Utc>,
}

/// Typed, namespaced cache with a single TTL per instance.
#[derive(Clone)]
pub struct ReferenceDataCache {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ReferenceDataCache {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The raw store key for a logical key name.
    pub fn storage_key(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}:{}", self.namespace, name)
        }
    }

    /// Return the cached value if it is present and no older than the TTL.
    ///
    /// Expired and unreadable entries are removed before returning `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey<T>) -> Option<T> {
        let storage_key = self.storage_key(key.name());

        let entry = match self.read_entry::<T>(&storage_key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!(key = %storage_key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "discarding unreadable cache entry");
                self.invalidate(key.name()).await;
                return None;
            }
        };

        let age_ms = self
            .clock
            .now()
            .signed_duration_since(entry.written_at)
            .num_milliseconds();
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

        if age_ms <= ttl_ms {
            tracing::debug!(key = %storage_key, age_ms, "cache hit");
            Some(entry.data)
        } else {
            tracing::debug!(key = %storage_key, age_ms, ttl_ms, "cache entry expired");
            self.invalidate(key.name()).await;
            None
        }
    }

    /// Store `value` stamped with the current time, replacing any previous
    /// entry. Write failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, key: &CacheKey<T>, value: &T) {
        let storage_key = self.storage_key(key.name());
        let entry = CacheEntry {
            data: value,
            written_at: self.clock.now(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(&storage_key, &json).await {
            tracing::warn!(key = %storage_key, error = %e, "failed to write cache entry");
        }
    }

    /// Remove one entry.
    pub async fn invalidate(&self, name: &str) {
        let storage_key = self.storage_key(name);
        if let Err(e) = self.store.remove(&storage_key).await {
            tracing::warn!(key = %storage_key, error = %e, "failed to remove cache entry");
        }
    }

    /// Remove several entries in one store call.
    pub async fn invalidate_all(&self, names: &[&str]) {
        let storage_keys: Vec<String> = names.iter().map(|n| self.storage_key(n)).collect();
        let refs: Vec<&str> = storage_keys.iter().map(String::as_str).collect();
        if let Err(e) = self.store.remove_many(&refs).await {
            tracing::warn!(keys = ?storage_keys, error = %e, "failed to remove cache entries");
        } else {
            tracing::debug!(keys = ?storage_keys, "cache entries cleared");
        }
    }

    async fn read_entry<T: DeserializeOwned>(
        &self,
        storage_key: &str,
    ) -> Result<Option<CacheEntry<T>>, CacheReadError> {
        match self.store.get(storage_key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for ReferenceDataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceDataCache")
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
