//! XDG config store adapter

use std::env;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// TOML file under the user's config directory
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// `<config dir>/notifytool/config.toml`
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_else(env::temp_dir);
        Self::with_path(base.join("notifytool").join("config.toml"))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file");
                Ok(AppConfig::empty())
            }
            Err(e) => Err(ConfigError::ReadError(e.to_string())),
        }
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_path_is_xdg() {
        let store = XdgConfigStore::new();
        let path = store.path();
        assert!(path.to_string_lossy().contains("notifytool"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn custom_path() {
        let store = XdgConfigStore::with_path("/custom/path/config.toml");
        assert_eq!(store.path(), PathBuf::from("/custom/path/config.toml"));
    }

    #[test]
    fn parse_toml_flat_format() {
        let content = r#"
bundle_name = "Reminders CLI"
bundle_identifier = "com.example.reminders"
consent_timeout_secs = 30.0
confirm_delivery = false
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.bundle_name.as_deref(), Some("Reminders CLI"));
        assert_eq!(
            config.bundle_identifier.as_deref(),
            Some("com.example.reminders")
        );
        assert_eq!(config.consent_timeout_secs, Some(30.0));
        assert_eq!(config.confirm_delivery, Some(false));
        assert!(config.container_dir.is_none());
    }

    #[test]
    fn parse_toml_rejects_wrong_types() {
        let err = XdgConfigStore::parse_toml("confirm_delivery = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let config = store.load().await.unwrap();
        assert!(config.bundle_name.is_none());
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "container_dir = \"/opt/notifytool\"\n").unwrap();

        let config = XdgConfigStore::with_path(&path).load().await.unwrap();
        assert_eq!(config.container_dir, Some(PathBuf::from("/opt/notifytool")));
    }

    #[tokio::test]
    async fn missing_parent_directory_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("absent").join("config.toml"));
        let config = store.load().await.unwrap();
        assert!(config.bundle_name.is_none());
        assert!(config.container_dir.is_none());
    }

    #[tokio::test]
    async fn unreadable_path_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = XdgConfigStore::with_path(dir.path()).load().await.unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}
