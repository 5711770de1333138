use async_trait::async_trait;
use std::net::Ipv4Addr;
use steer_dns_domain::DomainError;

/// A-record lookup against an explicit nameserver list, used by discovery.
#[async_trait]
pub trait AddressLookupPort: Send + Sync {
    async fn lookup_ipv4(
        &self,
        host: &str,
        nameservers: &[String],
    ) -> Result<Vec<Ipv4Addr>, DomainError>;
}
