use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::control::ControlConfig;
use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::hosts::ManagedHostConfig;
use super::logging::LoggingConfig;
use super::paths::PathsConfig;
use super::probe::ProbeConfig;
use super::server::ServerConfig;

/// Main configuration structure for Steer DNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (DNS and control ports, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream resolution configuration
    #[serde(default)]
    pub dns: DnsConfig,

    /// Positive and negative response caches
    #[serde(default)]
    pub cache: CacheConfig,

    /// Candidate discovery and probing
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Steered hostnames
    #[serde(default)]
    pub hosts: Vec<ManagedHostConfig>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. steer-dns.toml in current directory
    /// 3. /etc/steer-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.into(),
                source,
            })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(port) = overrides.web_port {
            self.server.web_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::invalid("server.dns_port", "cannot be 0"));
        }
        if self.server.control_enabled {
            if self.server.web_port == 0 {
                return Err(ConfigError::invalid("server.web_port", "cannot be 0"));
            }
            if self.control.secret.as_deref().map_or(true, |s| s.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    "control.secret",
                    "required while the control API is enabled",
                ));
            }
        }

        if self.dns.nameservers.is_empty() {
            return Err(ConfigError::invalid("dns.nameservers", "no default nameservers"));
        }
        for (suffix, servers) in &self.dns.domain_nameservers {
            if servers.is_empty() {
                return Err(ConfigError::invalid(
                    format!("dns.domain_nameservers.{}", suffix),
                    "empty nameserver list",
                ));
            }
        }
        if self.dns.lookup_timeout.is_zero() {
            return Err(ConfigError::invalid("dns.lookup_timeout", "must be positive"));
        }

        let probe = &self.probe;
        for (key, workers) in [
            ("probe.resolve_workers", probe.resolve_workers),
            ("probe.ping_workers", probe.ping_workers),
            ("probe.http_workers", probe.http_workers),
        ] {
            if workers == 0 {
                return Err(ConfigError::invalid(key, "must be at least 1"));
            }
        }
        if probe.ping_count == 0 {
            return Err(ConfigError::invalid("probe.ping_count", "must be at least 1"));
        }
        if probe.refresh_interval.is_zero() {
            return Err(ConfigError::invalid("probe.refresh_interval", "must be positive"));
        }
        if probe.ping_relative_factor <= 0.0 {
            return Err(ConfigError::invalid(
                "probe.ping_relative_factor",
                "must be positive",
            ));
        }

        for host in &self.hosts {
            if host.host.trim().is_empty() {
                return Err(ConfigError::invalid("hosts.host", "managed host without a name"));
            }
            if host.tests.is_empty() {
                return Err(ConfigError::invalid(
                    format!("hosts.{}.tests", host.host),
                    "no test objects",
                ));
            }
            if let Some(bad) = host.tests.iter().find(|t| !t.has_valid_hash()) {
                return Err(ConfigError::invalid(
                    format!("hosts.{}.tests", host.host),
                    format!("'{}' has a malformed hash", bad.url),
                ));
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("steer-dns.toml").exists() {
            Some("steer-dns.toml".to_string())
        } else if std::path::Path::new("/etc/steer-dns/config.toml").exists() {
            Some("/etc/steer-dns/config.toml".to_string())
        } else {
            None
        }
    }

    pub fn managed_host(&self, name: &str) -> Option<&ManagedHostConfig> {
        let wanted = name.trim_end_matches('.');
        self.hosts
            .iter()
            .find(|h| h.host.trim_end_matches('.').eq_ignore_ascii_case(wanted))
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub web_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
