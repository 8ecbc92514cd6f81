//! Persistent key-value storage for the field representative client, plus the
//! reference-data models that are cached in it.
//!
//! The store is deliberately dumb: string keys, string values, no
//! transactions. Typing, expiry and namespacing live one layer up in
//! `fieldrep_core::cache`.

pub mod config;
pub mod error;
pub mod file;
pub mod kv;
pub mod models;

pub use config::StoreConfig;
pub use error::StoreError;
pub use file::FileStore;
pub use kv::{KeyValueStore, MemoryStore};
