//! XDG config store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::BridgeConfig;
use crate::domain::error::ConfigError;

/// Directory name under the platform config and data directories
const APP_DIR: &str = "mic-bridge";

/// XDG-compliant config store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Create a new XDG config store with default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse TOML content into BridgeConfig
    fn parse_toml(content: &str) -> Result<BridgeConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize BridgeConfig to TOML
    fn to_toml(config: &BridgeConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Where recordings go when `output_dir` is not configured:
/// the user's audio directory, else the local data directory.
pub fn default_output_dir() -> PathBuf {
    dirs::audio_dir()
        .map(|dir| dir.join(APP_DIR))
        .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join("recordings")))
        .unwrap_or_else(|| PathBuf::from(APP_DIR))
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<BridgeConfig, ConfigError> {
        if !self.exists() {
            // Return empty config if file doesn't exist
            return Ok(BridgeConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse_toml(&content)
    }

    async fn save(&self, config: &BridgeConfig) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = Self::to_toml(config)?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        let mut defaults = BridgeConfig::defaults();
        defaults.output_dir = Some(default_output_dir().to_string_lossy().to_string());
        self.save(&defaults).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::InputConfig;

    #[test]
    fn default_path_is_xdg() {
        let store = XdgConfigStore::new();
        let path = store.path();
        assert!(path.to_string_lossy().contains("mic-bridge"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn custom_path() {
        let store = XdgConfigStore::with_path("/custom/path/config.toml");
        assert_eq!(store.path(), PathBuf::from("/custom/path/config.toml"));
    }

    #[test]
    fn parse_toml_with_input_table() {
        let content = r#"
output_dir = "/home/me/Music"
event_name = "memo-done"
background = true
wake_lock_minutes = 20

[input]
format = "alsa"
device = "hw:1"
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("/home/me/Music"));
        assert_eq!(config.event_name.as_deref(), Some("memo-done"));
        assert_eq!(config.background, Some(true));
        assert_eq!(config.wake_lock_minutes, Some(20));
        assert_eq!(config.input_format_or_default(), "alsa");
        assert_eq!(config.input_device_or_default(), "hw:1");
    }

    #[test]
    fn parse_toml_rejects_wrong_types() {
        let err = XdgConfigStore::parse_toml("background = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn to_toml_round_trip() {
        let config = BridgeConfig {
            output_dir: Some("/rec".to_string()),
            notify: Some(false),
            input: Some(InputConfig {
                format: Some("pulse".to_string()),
                device: None,
            }),
            ..Default::default()
        };

        let toml = XdgConfigStore::to_toml(&config).unwrap();
        let parsed = XdgConfigStore::parse_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested").join("config.toml"));

        assert!(store.load().await.unwrap().event_name.is_none());
        store.init().await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.event_name.as_deref(), Some("recording-complete"));
        assert!(loaded.output_dir.is_some());

        assert!(matches!(store.init().await, Err(ConfigError::AlreadyExists(_))));
    }

    #[test]
    fn default_output_dir_names_the_app() {
        assert!(default_output_dir().to_string_lossy().contains("mic-bridge"));
    }
}
