use async_trait::async_trait;
use steer_dns_domain::DomainError;

/// Public list of open resolvers, one list per country code.
#[async_trait]
pub trait NameserverFeedPort: Send + Sync {
    async fn fetch(&self, country: &str) -> Result<Vec<String>, DomainError>;
}
