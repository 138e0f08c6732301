//! Configuration provider trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Adapter runtime settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterSettings {
    /// Registry endpoint serving the server catalog
    #[serde(default)]
    pub registry_url: Option<String>,

    /// Serve the built-in mock dataset instead of fetching the registry
    #[serde(default)]
    pub use_mock_data: bool,

    /// Timeout for registry catalog fetches, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Per-call tool execution timeout, in seconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Refresh the catalog periodically in the background
    #[serde(default)]
    pub auto_refresh: bool,

    /// Interval between automatic refreshes, in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_call_timeout() -> u64 {
    30
}

fn default_refresh_interval() -> u64 {
    300
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            registry_url: None,
            use_mock_data: false,
            request_timeout_secs: default_request_timeout(),
            call_timeout_secs: default_call_timeout(),
            auto_refresh: false,
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl AdapterSettings {
    /// Settings preset that serves only the mock dataset
    pub fn mock() -> Self {
        Self {
            use_mock_data: true,
            ..Self::default()
        }
    }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = Some(url.into());
        self
    }

    pub fn with_call_timeout_secs(mut self, secs: u64) -> Self {
        self.call_timeout_secs = secs;
        self
    }
}

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: Reads from YAML file (~/.config/mcp-adapter/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Get the current adapter settings
    async fn get_settings(&self) -> AdapterSettings;

    /// Replace the adapter settings
    async fn set_settings(&self, settings: AdapterSettings) -> Result<(), ConfigError>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AdapterSettings::default();
        assert!(settings.registry_url.is_none());
        assert!(!settings.use_mock_data);
        assert_eq!(settings.request_timeout_secs, 10);
        assert_eq!(settings.call_timeout_secs, 30);
        assert_eq!(settings.refresh_interval_secs, 300);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let settings: AdapterSettings =
            serde_yaml::from_str("registry_url: http://localhost:9000/servers\n").unwrap();
        assert_eq!(
            settings.registry_url.as_deref(),
            Some("http://localhost:9000/servers")
        );
        assert_eq!(settings.call_timeout_secs, 30);
    }

    #[test]
    fn test_mock_preset() {
        let settings = AdapterSettings::mock();
        assert!(settings.use_mock_data);
    }
}
