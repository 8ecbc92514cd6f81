//! Configuration file management for fieldrep.
//!
//! Provides a TOML-based config file at `~/.config/fieldrep/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fieldrep_core::cache::DEFAULT_TTL;
use fieldrep_core::pipeline::HttpTransport;
use fieldrep_store::StoreConfig;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/graphql";

pub const ENDPOINT_ENV: &str = "FIELDREP_ENDPOINT";
pub const CACHE_TTL_ENV: &str = "FIELDREP_CACHE_TTL_SECS";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub cache: CacheSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendSection {
    /// GraphQL endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSection {
    /// How long reference data stays fresh.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Override for the persistent store file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            store_path: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    HttpTransport::DEFAULT_TIMEOUT.as_secs()
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fieldrep config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fieldrep` or
/// `~/.config/fieldrep`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fieldrep");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fieldrep")
}

/// Return the path to the fieldrep config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FieldRepConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub store: StoreConfig,
}

impl FieldRepConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Endpoint: `cli_endpoint` > `FIELDREP_ENDPOINT` > `backend.endpoint` > [`DEFAULT_ENDPOINT`]
    /// - Store: `cli_store_path` > `FIELDREP_STORE_PATH` > `cache.store_path` > [`StoreConfig::default_path`]
    /// - Cache TTL: `FIELDREP_CACHE_TTL_SECS` > `cache.ttl_secs` > 300 seconds
    ///
    /// A missing config file is fine; a malformed one is an error.
    pub fn resolve(cli_endpoint: Option<&str>, cli_store_path: Option<&Path>) -> Result<Self> {
        let path = config_path();
        let file_config = if path.exists() {
            Some(load_config_from(&path)?)
        } else {
            None
        };

        let endpoint = if let Some(url) = cli_endpoint {
            url.to_string()
        } else if let Some(url) = non_empty_env(ENDPOINT_ENV) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.backend.endpoint.clone()
        } else {
            DEFAULT_ENDPOINT.to_string()
        };

        let store_path = if let Some(p) = cli_store_path {
            p.to_path_buf()
        } else if let Some(p) = non_empty_env(StoreConfig::ENV_VAR) {
            PathBuf::from(p)
        } else if let Some(p) = file_config.as_ref().and_then(|c| c.cache.store_path.clone()) {
            p
        } else {
            StoreConfig::default_path()
        };

        let ttl_secs = if let Some(raw) = non_empty_env(CACHE_TTL_ENV) {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("{CACHE_TTL_ENV} must be a whole number of seconds, got {raw:?}"))?
        } else if let Some(ref cfg) = file_config {
            cfg.cache.ttl_secs
        } else {
            default_ttl_secs()
        };

        let timeout_secs = file_config
            .as_ref()
            .map(|c| c.backend.timeout_secs)
            .unwrap_or_else(default_timeout_secs);

        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            cache_ttl: Duration::from_secs(ttl_secs),
            store: StoreConfig::new(store_path),
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point the config directory at a temp dir and clear the overrides.
    fn isolate(tmp: &tempfile::TempDir) {
        // SAFETY: callers hold the env lock for the duration of the test.
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", tmp.path());
            std::env::remove_var(ENDPOINT_ENV);
            std::env::remove_var(CACHE_TTL_ENV);
            std::env::remove_var(StoreConfig::ENV_VAR);
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);

        let original = ConfigFile {
            backend: BackendSection {
                endpoint: "https://api.example.test/graphql".to_string(),
                timeout_secs: 12,
            },
            cache: CacheSection {
                ttl_secs: 60,
                store_path: Some(PathBuf::from("/var/lib/fieldrep/store.json")),
            },
        };
        save_config(&original).unwrap();
        assert_eq!(config_path(), tmp.path().join("fieldrep").join("config.toml"));

        let loaded = load_config().unwrap();
        assert_eq!(loaded.backend.endpoint, "https://api.example.test/graphql");
        assert_eq!(loaded.backend.timeout_secs, 12);
        assert_eq!(loaded.cache.ttl_secs, 60);
        assert_eq!(
            loaded.cache.store_path.as_deref(),
            Some(Path::new("/var/lib/fieldrep/store.json"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn saved_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);

        save_config(&ConfigFile::default()).unwrap();
        let mode = std::fs::metadata(config_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn sections_may_be_omitted() {
        let cfg: ConfigFile = toml::from_str("[backend]\nendpoint = \"http://x/graphql\"\n").unwrap();
        assert_eq!(cfg.backend.endpoint, "http://x/graphql");
        assert_eq!(cfg.backend.timeout_secs, 30);
        assert_eq!(cfg.cache.ttl_secs, 300);
        assert!(cfg.cache.store_path.is_none());
    }

    #[test]
    fn resolve_defaults_without_file_or_env() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);

        let cfg = FieldRepConfig::resolve(None, None).unwrap();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.store.path, StoreConfig::default_path());
    }

    #[test]
    fn resolve_prefers_file_over_default() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);

        save_config(&ConfigFile {
            backend: BackendSection {
                endpoint: "http://file/graphql".to_string(),
                timeout_secs: 5,
            },
            cache: CacheSection {
                ttl_secs: 90,
                store_path: Some(tmp.path().join("from-file.json")),
            },
        })
        .unwrap();

        let cfg = FieldRepConfig::resolve(None, None).unwrap();
        assert_eq!(cfg.endpoint, "http://file/graphql");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(90));
        assert_eq!(cfg.store.path, tmp.path().join("from-file.json"));
    }

    #[test]
    fn resolve_prefers_env_over_file_and_cli_over_env() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);

        save_config(&ConfigFile {
            backend: BackendSection {
                endpoint: "http://file/graphql".to_string(),
                timeout_secs: 5,
            },
            cache: CacheSection {
                ttl_secs: 90,
                store_path: Some(tmp.path().join("from-file.json")),
            },
        })
        .unwrap();
        unsafe {
            std::env::set_var(ENDPOINT_ENV, "http://env/graphql");
            std::env::set_var(CACHE_TTL_ENV, "15");
            std::env::set_var(StoreConfig::ENV_VAR, tmp.path().join("from-env.json"));
        }

        let cfg = FieldRepConfig::resolve(None, None).unwrap();
        assert_eq!(cfg.endpoint, "http://env/graphql");
        assert_eq!(cfg.cache_ttl, Duration::from_secs(15));
        assert_eq!(cfg.store.path, tmp.path().join("from-env.json"));

        let cli_store = tmp.path().join("from-cli.json");
        let cfg = FieldRepConfig::resolve(Some("http://cli/graphql"), Some(&cli_store)).unwrap();
        assert_eq!(cfg.endpoint, "http://cli/graphql");
        assert_eq!(cfg.store.path, cli_store);

        unsafe {
            std::env::remove_var(ENDPOINT_ENV);
            std::env::remove_var(CACHE_TTL_ENV);
            std::env::remove_var(StoreConfig::ENV_VAR);
        }
    }

    #[test]
    fn bad_ttl_env_is_an_error() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);
        unsafe { std::env::set_var(CACHE_TTL_ENV, "five minutes") };

        let err = FieldRepConfig::resolve(None, None).unwrap_err();
        assert!(format!("{err:#}").contains(CACHE_TTL_ENV));

        unsafe { std::env::remove_var(CACHE_TTL_ENV) };
    }

    #[test]
    fn malformed_file_is_an_error() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        isolate(&tmp);

        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), "[backend\nendpoint = ").unwrap();

        let err = FieldRepConfig::resolve(None, None).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }
}
