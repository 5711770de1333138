use std::sync::Arc;
use steer_dns_domain::{CliOverrides, Config, DomainError};
use tokio::sync::RwLock;
use tracing::info;

/// Re-reads the config file and swaps the shared config. Components that
/// read the config per cycle pick the change up on their next run.
///
/// Command-line overrides given at startup are applied again on every reload.
pub struct ReloadConfigUseCase {
    config: Arc<RwLock<Config>>,
    config_path: Option<String>,
    overrides: CliOverrides,
}

impl ReloadConfigUseCase {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            config_path: None,
            overrides: CliOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.config_path = path;
        self
    }

    pub async fn execute(&self) -> Result<Config, DomainError> {
        let path = self
            .config_path
            .clone()
            .or_else(Config::get_config_path)
            .ok_or_else(|| DomainError::ConfigError("No config file to reload".to_string()))?;

        let new_config = Config::load(Some(&path), self.overrides.clone())
            .map_err(|e| DomainError::ConfigError(format!("Config load error: {}", e)))?;

        new_config
            .validate()
            .map_err(|e| DomainError::ConfigError(format!("Config validation error: {}", e)))?;

        {
            let mut config = self.config.write().await;
            *config = new_config.clone();
        }

        info!(path = %path, hosts = new_config.hosts.len(), "Configuration reloaded");

        Ok(new_config)
    }
}
