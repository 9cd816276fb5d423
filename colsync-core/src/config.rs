//! Project configuration.
//!
//! Read from an optional `colsync.yaml` in the working directory. Every field
//! has a default, so a missing file is equivalent to an empty one.
//!
//! ```yaml
//! base_url: https://api.getpostman.com
//! workspace: 0f1e2d3c-...
//! cache_path: .colsync/collection-ids.json
//! timeout_secs: 30
//! api_key_env: COLSYNC_API_KEY
//! ```
//!
//! The API key itself never lives in the file. It is read once from the
//! environment variable named by `api_key_env` and handed to the client as
//! an explicit [`ApiKey`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "colsync.yaml";
pub const DEFAULT_BASE_URL: &str = "https://api.getpostman.com";
pub const DEFAULT_CACHE_PATH: &str = ".colsync/collection-ids.json";
pub const DEFAULT_API_KEY_ENV: &str = "COLSYNC_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Workspace new collections are created in. `None` lets the service pick.
    pub workspace: Option<String>,
    pub cache_path: PathBuf,
    pub timeout_secs: u64,
    pub api_key_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace: None,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl Config {
    /// `<root>/colsync.yaml`: pure, no I/O.
    pub fn path_at(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load `<root>/colsync.yaml`, falling back to defaults when absent.
    pub fn load_at(root: &Path) -> Result<Self, ConfigError> {
        Self::load_optional(&Self::path_at(root))
    }

    /// Load `path`, falling back to defaults when absent.
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load `path`; the file must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The cache file, with relative paths resolved against `root`.
    pub fn cache_path_at(&self, root: &Path) -> PathBuf {
        if self.cache_path.is_absolute() {
            self.cache_path.clone()
        } else {
            root.join(&self.cache_path)
        }
    }

    /// Read the API key from the process environment.
    pub fn api_key_from_env(&self) -> Result<ApiKey, ConfigError> {
        self.api_key_with(|var| std::env::var(var).ok())
    }

    /// Read the API key through `lookup`, keyed by `api_key_env`.
    pub fn api_key_with(
        &self,
        lookup: impl FnOnce(&str) -> Option<String>,
    ) -> Result<ApiKey, ConfigError> {
        lookup(&self.api_key_env)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(ApiKey)
            .ok_or_else(|| ConfigError::MissingApiKey {
                var: self.api_key_env.clone(),
            })
    }
}

/// Credential for the collection service. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_at(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            Config::path_at(tmp.path()),
            "workspace: ws-123\ntimeout_secs: 5\n",
        )
        .unwrap();

        let config = Config::load_at(tmp.path()).unwrap();
        assert_eq!(config.workspace.as_deref(), Some("ws-123"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
    }

    #[test]
    fn malformed_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = Config::path_at(tmp.path());
        std::fs::write(&path, "timeout_secs: [not a number\n").unwrap();

        let err = Config::load_at(tmp.path()).unwrap_err();
        match err {
            ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn relative_cache_path_resolves_against_root() {
        let config = Config::default();
        let root = Path::new("/work/pipeline");
        assert_eq!(
            config.cache_path_at(root),
            root.join(".colsync").join("collection-ids.json")
        );
    }

    #[test]
    fn api_key_is_read_from_configured_variable() {
        let config = Config {
            api_key_env: "MY_KEY".to_string(),
            ..Config::default()
        };
        let key = config
            .api_key_with(|var| (var == "MY_KEY").then(|| "  secret ".to_string()))
            .unwrap();
        assert_eq!(key.expose(), "secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn blank_api_key_is_missing() {
        let config = Config::default();
        let err = config.api_key_with(|_| Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { var } if var == DEFAULT_API_KEY_ENV));
    }
}
