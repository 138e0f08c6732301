//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/mcp-adapter/config.yaml) and workspace-level
//! (.config/mcp-adapter/config.yaml) config.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{AdapterSettings, ConfigError, ConfigProvider, ConfigResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Adapter settings
    #[serde(default)]
    pub settings: AdapterSettings,
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/mcp-adapter/config.yaml)
    User,
    /// Workspace-level config (.config/mcp-adapter/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// Reads and writes configuration from YAML files.
///
/// # Example
///
/// ```no_run
/// use mcp_adapter_core::config::FileConfigProvider;
///
/// // User-level config
/// let user_config = FileConfigProvider::user();
///
/// // Workspace-level config
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/mcp-adapter/config.yaml)
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        let path = config_dir.join("mcp-adapter").join("config.yaml");
        Self::new(path, ConfigLevel::User)
    }

    /// Create a workspace-level config provider (.config/mcp-adapter/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("mcp-adapter")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the config level
    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load config from file
    fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Other(format!("Failed to parse YAML: {}", e)))?;

        Ok(config)
    }

    /// Save config to file
    fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)
            .map_err(|e| ConfigError::Other(format!("Failed to serialize YAML: {}", e)))?;

        fs::write(&self.path, content)?;

        let mut cache = self.cache.write().unwrap();
        *cache = Some(config.clone());

        Ok(())
    }

    /// Get cached or load config
    fn get_config(&self) -> ConfigResult<ConfigFile> {
        let cache = self.cache.read().unwrap();
        if let Some(config) = cache.as_ref() {
            return Ok(config.clone());
        }
        drop(cache);

        let config = self.load()?;
        let mut cache = self.cache.write().unwrap();
        *cache = Some(config.clone());
        Ok(config)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.load()?;
        let mut cache = self.cache.write().unwrap();
        *cache = Some(config.clone());
        Ok(config)
    }

    /// Create a backup of the current config file
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }

        let backup_path = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &backup_path)?;
        Ok(Some(backup_path))
    }

    /// Export config as pretty JSON (for migration tooling)
    pub fn export_json(&self) -> ConfigResult<String> {
        let config = self.get_config()?;
        serde_json::to_string_pretty(&config)
            .map_err(|e| ConfigError::Other(format!("Failed to serialize JSON: {}", e)))
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn get_settings(&self) -> AdapterSettings {
        self.get_config().map(|c| c.settings).unwrap_or_default()
    }

    async fn set_settings(&self, settings: AdapterSettings) -> ConfigResult<()> {
        let mut config = self.get_config()?;
        config.settings = settings;
        self.save(&config)
    }
}
