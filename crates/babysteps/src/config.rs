//! Configuration management for babysteps.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "babysteps";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "babysteps.db";

/// Default flags file name.
const FLAGS_FILE_NAME: &str = "flags.json";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "BABYSTEPS_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BABYSTEPS_`, nested keys
///    separated by `__`)
/// 2. TOML config file at `~/.config/babysteps/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session configuration.
    pub session: SessionConfig,
}

/// Which record backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local `SQLite` database file.
    #[default]
    Sqlite,
    /// Process memory only. Nothing survives a restart.
    Memory,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Record backend.
    pub backend: BackendKind,
    /// Path to the database file.
    /// Defaults to `~/.local/share/babysteps/babysteps.db`
    pub database_path: Option<PathBuf>,
    /// Path to the flags file holding the credential and launch flag.
    /// Defaults to `~/.local/share/babysteps/flags.json`
    pub flags_path: Option<PathBuf>,
}

/// Session-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last change before the snapshot is saved.
    pub autosave_debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 1000,
        }
    }
}

impl SessionConfig {
    /// Get the autosave quiet period as a Duration.
    #[must_use]
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config = Self::figment(&config_file).merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = config.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load only defaults and the given file, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn load_file(config_file: &Path) -> Result<Self> {
        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.session.autosave_debounce_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "autosave_debounce_ms must be greater than 0".to_string(),
            });
        }

        if let (Some(db), Some(flags)) = (&self.storage.database_path, &self.storage.flags_path) {
            if db == flags {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "database_path and flags_path must differ (both are {})",
                        db.display()
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the flags file path, resolving defaults if not set.
    #[must_use]
    pub fn flags_path(&self) -> PathBuf {
        self.storage
            .flags_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(FLAGS_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.backend, BackendKind::Sqlite);
        assert!(config.storage.database_path.is_none());
        assert!(config.storage.flags_path.is_none());
        assert_eq!(config.session.autosave_debounce_ms, 1000);
    }

    #[test]
    fn test_autosave_delay() {
        let session = SessionConfig::default();
        assert_eq!(session.autosave_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_debounce() {
        let mut config = Config::default();
        config.session.autosave_debounce_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("autosave_debounce_ms"));
    }

    #[test]
    fn test_validate_same_paths() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/same"));
        config.storage.flags_path = Some(PathBuf::from("/tmp/same"));

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must differ"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.ends_with("babysteps/babysteps.db"));
    }

    #[test]
    fn test_flags_path_default() {
        let path = Config::default().flags_path();
        assert!(path.ends_with("babysteps/flags.json"));
    }

    #[test]
    fn test_paths_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/db.sqlite"));
        config.storage.flags_path = Some(PathBuf::from("/custom/flags.json"));

        assert_eq!(config.database_path(), PathBuf::from("/custom/db.sqlite"));
        assert_eq!(config.flags_path(), PathBuf::from("/custom/flags.json"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.ends_with("babysteps/config.toml"));
    }

    #[test]
    fn test_load_file_nonexistent_uses_defaults() {
        let config = Config::load_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_file_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\nbackend = \"memory\"\n\n[session]\nautosave_debounce_ms = 250\n",
        )
        .unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.storage.backend, BackendKind::Memory);
        assert_eq!(config.session.autosave_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nautosave_debounce_ms = 0\n").unwrap();

        assert!(matches!(
            Config::load_file(&path),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_load_file_rejects_unknown_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nbackend = \"indexeddb\"\n").unwrap();

        assert!(matches!(
            Config::load_file(&path),
            Err(Error::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_backend_kind_serde() {
        let json = serde_json::to_string(&BackendKind::Memory).unwrap();
        assert_eq!(json, "\"memory\"");
        let kind: BackendKind = serde_json::from_str("\"sqlite\"").unwrap();
        assert_eq!(kind, BackendKind::Sqlite);
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"database_path": "/data/b.db"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.backend, BackendKind::Sqlite);
        assert_eq!(storage.database_path, Some(PathBuf::from("/data/b.db")));
    }
}
