//! Integration tests for the JSON-file-backed store.
//!
//! Each test works inside its own temporary directory.

use fieldrep_store::{FileStore, KeyValueStore, StoreConfig, StoreError};

fn config_in(dir: &tempfile::TempDir) -> StoreConfig {
    StoreConfig::new(dir.path().join("nested").join("store.json"))
}

#[tokio::test]
async fn open_missing_file_is_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = FileStore::open(&config_in(&tmp)).await.unwrap();

    assert_eq!(store.get("anything").await.unwrap(), None);
    assert!(
        !store.path().exists(),
        "opening must not create the file before the first write"
    );
}

#[tokio::test]
async fn values_survive_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_in(&tmp);

    {
        let store = FileStore::open(&config).await.unwrap();
        store.set("auth:token", "tok-123").await.unwrap();
        store.set("auth:company_id", "42").await.unwrap();
    }

    let reopened = FileStore::open(&config).await.unwrap();
    assert_eq!(reopened.get("auth:token").await.unwrap().as_deref(), Some("tok-123"));
    assert_eq!(reopened.get("auth:company_id").await.unwrap().as_deref(), Some("42"));
}

#[tokio::test]
async fn remove_and_remove_many_persist() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_in(&tmp);

    let store = FileStore::open(&config).await.unwrap();
    for key in ["a", "b", "c", "d"] {
        store.set(key, "v").await.unwrap();
    }
    store.remove("a").await.unwrap();
    store.remove_many(&["b", "c", "missing"]).await.unwrap();

    let reopened = FileStore::open(&config).await.unwrap();
    assert_eq!(reopened.get("a").await.unwrap(), None);
    assert_eq!(reopened.get("b").await.unwrap(), None);
    assert_eq!(reopened.get("c").await.unwrap(), None);
    assert_eq!(reopened.get("d").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_in(&tmp);
    std::fs::create_dir_all(config.parent_dir().unwrap()).unwrap();
    std::fs::write(&config.path, "{ not json").unwrap();

    let err = FileStore::open(&config).await.unwrap_err();
    assert!(
        matches!(err, StoreError::Corrupt { .. }),
        "expected Corrupt, got: {err}"
    );
}

#[tokio::test]
async fn no_temp_file_left_behind() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_in(&tmp);

    let store = FileStore::open(&config).await.unwrap();
    store.set("k", "v").await.unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(config.parent_dir().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[tokio::test]
async fn failed_write_leaves_memory_matching_disk() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_in(&tmp);

    let store = FileStore::open(&config).await.unwrap();
    store.set("auth:token", "old").await.unwrap();
    store.set("auth:company", "42").await.unwrap();

    // A directory where the temp file goes makes every flush fail.
    let blocker = config.path.with_extension("json.tmp");
    std::fs::create_dir(&blocker).unwrap();

    assert!(store.set("auth:token", "new").await.is_err());
    assert!(store.remove("auth:token").await.is_err());
    assert!(store.remove_many(&["auth:token", "auth:company"]).await.is_err());

    assert_eq!(store.get("auth:token").await.unwrap().as_deref(), Some("old"));
    assert_eq!(store.get("auth:company").await.unwrap().as_deref(), Some("42"));

    std::fs::remove_dir(&blocker).unwrap();
    let reopened = FileStore::open(&config).await.unwrap();
    assert_eq!(reopened.get("auth:token").await.unwrap().as_deref(), Some("old"));
}
