//! JSON-file-backed [`KeyValueStore`].
//!
//! The whole map is held in memory and rewritten on every mutation. Writes go
//! to a sibling temp file first and are renamed into place, so a crash never
//! leaves a half-written store behind. A mutation only reaches the in-memory
//! map once it is on disk; a failed write leaves both unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// A key-value store persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store described by `config`.
    ///
    /// A missing file is an empty store; the file is created on the first
    /// write. A file that exists but does not parse is an error.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.path.clone();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                StoreError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), keys = entries.len(), "opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_owned(), value.to_owned());
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if !keys.iter().any(|key| entries.contains_key(*key)) {
            return Ok(());
        }
        let mut next = entries.clone();
        for key in keys {
            next.remove(*key);
        }
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }
}
