use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;
use steer_dns_domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingStats {
    pub sent: u32,
    pub received: u32,
    /// Mean over answered packets; `None` when nothing came back.
    pub mean_rtt: Option<Duration>,
}

impl PingStats {
    pub fn lossless(&self) -> bool {
        self.sent > 0 && self.received == self.sent
    }
}

#[async_trait]
pub trait PingerPort: Send + Sync {
    async fn ping(
        &self,
        addr: Ipv4Addr,
        count: u32,
        timeout: Duration,
    ) -> Result<PingStats, DomainError>;
}
