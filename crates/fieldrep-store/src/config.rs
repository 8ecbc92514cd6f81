use std::env;
use std::path::{Path, PathBuf};

/// Persistent store configuration.
///
/// Reads from the `FIELDREP_STORE_PATH` environment variable, falling back to
/// `<platform data dir>/fieldrep/store.json` when unset.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Location of the JSON file backing the store.
    pub path: PathBuf,
}

impl StoreConfig {
    /// Environment variable that overrides the store location.
    pub const ENV_VAR: &str = "FIELDREP_STORE_PATH";

    /// File name used inside the default data directory.
    pub const FILE_NAME: &str = "store.json";

    /// Build a config from the environment.
    ///
    /// Priority: `FIELDREP_STORE_PATH` env var, then [`Self::default_path`].
    pub fn from_env() -> Self {
        let path = env::var_os(Self::ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        Self { path }
    }

    /// Build a config from an explicit path (useful for tests and CLI flags).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default store location: `<data dir>/fieldrep/store.json`.
    ///
    /// Falls back to the current directory on platforms without a data dir.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fieldrep")
            .join(Self::FILE_NAME)
    }

    /// Directory that must exist before the store file can be written.
    pub fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
