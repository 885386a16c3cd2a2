//! Configuration file handling
//!
//! Strata reads one TOML file: the one named by `-c`/`STRATA_CONFIG`, or
//! `config.toml` in the per-user config directory. No file means defaults.
//! A file that is present has to parse and validate; otherwise the command
//! fails and names the file.

pub mod schema;

pub use schema::Config;

use crate::error::{StrataError, StrataResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const APP_DIR: &str = "strata";
const CONFIG_FILE: &str = "config.toml";

/// Location of the config file, and reads and writes of it
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `path` when given, otherwise the per-user file
    pub fn locate(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::with_path(path),
            None => Self::new(),
        }
    }

    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config dir>/strata/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Where the audit log is appended
    pub fn audit_log_path() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("audit.log")
    }

    /// Read the config file, or defaults when there is none
    pub async fn load(&self) -> StrataResult<Config> {
        match fs::read_to_string(&self.config_path).await {
            Ok(content) => {
                debug!("Loading config from {}", self.config_path.display());
                parse(&self.config_path, &content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                Ok(Config::default())
            }
            Err(e) => Err(StrataError::io(
                format!("reading config from {}", self.config_path.display()),
                e,
            )),
        }
    }

    /// Write `config`, creating the directory if needed
    pub async fn save(&self, config: &Config) -> StrataResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StrataError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            StrataError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode and validate the contents of the file at `path`
fn parse(path: &Path, content: &str) -> StrataResult<Config> {
    let invalid = |reason: String| StrataError::ConfigInvalid {
        path: path.to_path_buf(),
        reason,
    };
    let config: Config = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
    config.validate().map_err(invalid)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn locate_prefers_explicit_path() {
        let explicit = PathBuf::from("/tmp/strata-test/custom.toml");
        assert_eq!(ConfigManager::locate(Some(explicit.clone())).path(), explicit);
        assert_eq!(
            ConfigManager::locate(None).path(),
            ConfigManager::default_config_path()
        );
        assert!(ConfigManager::default_config_path().ends_with("strata/config.toml"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse(Path::new("config.toml"), "[secrets]\nenv_prefix = \"LANDSCAPE_\"\n").unwrap();
        assert_eq!(config.secrets.env_prefix, "LANDSCAPE_");
        assert_eq!(config.kubernetes.namespace, "default");
        assert_eq!(config.general.log_format, "text");
    }

    #[test]
    fn malformed_toml_is_invalid() {
        let err = parse(Path::new("broken.toml"), "[kubernetes\n").unwrap_err();
        assert!(matches!(err, StrataError::ConfigInvalid { ref path, .. } if path == Path::new("broken.toml")));
    }

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nonexistent.toml"));

        let config = manager.load().await.unwrap();
        assert_eq!(config.kubernetes.namespace, "default");
        assert!(!manager.exists());
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nested").join("config.toml"));

        let mut config = Config::default();
        config.kubernetes.namespace = "landscape".to_string();
        config.general.audit_log = true;

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.kubernetes.namespace, "landscape");
        assert!(loaded.general.audit_log);
    }

    #[tokio::test]
    async fn invalid_file_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[general]\nlog_format = \"xml\"\n").await.unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        match err {
            StrataError::ConfigInvalid { path: p, reason } => {
                assert_eq!(p, path);
                assert!(reason.contains("xml"));
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[tokio::test]
    async fn directory_in_place_of_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let err = ConfigManager::with_path(temp.path().to_path_buf()).load().await.unwrap_err();
        assert!(matches!(err, StrataError::Io { .. }));
    }
}
