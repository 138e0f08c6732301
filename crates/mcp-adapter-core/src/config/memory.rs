//! In-memory configuration provider

use std::sync::RwLock;

use async_trait::async_trait;

use super::traits::{AdapterSettings, ConfigError, ConfigProvider};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    settings: RwLock<AdapterSettings>,
}

impl MemoryConfigProvider {
    /// Create a provider holding default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with initial settings
    pub fn with_settings(settings: AdapterSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn get_settings(&self) -> AdapterSettings {
        self.settings.read().unwrap().clone()
    }

    async fn set_settings(&self, settings: AdapterSettings) -> Result<(), ConfigError> {
        *self.settings.write().unwrap() = settings;
        Ok(())
    }
}
