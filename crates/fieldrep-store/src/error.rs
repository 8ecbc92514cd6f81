use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::KeyValueStore`] implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not a valid key-value document: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
