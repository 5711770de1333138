use async_trait::async_trait;
use serde::Deserialize;
use steer_dns_domain::DomainError;

/// One historical domain-to-address association.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PassiveResolution {
    pub ip_address: String,
    /// `YYYY-MM-DD`
    pub last_resolved: String,
}

impl PassiveResolution {
    pub fn new(ip_address: impl Into<String>, last_resolved: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            last_resolved: last_resolved.into(),
        }
    }
}

#[async_trait]
pub trait PassiveDnsPort: Send + Sync {
    async fn resolutions(&self, host: &str) -> Result<Vec<PassiveResolution>, DomainError>;
}
