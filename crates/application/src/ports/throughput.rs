use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use steer_dns_domain::{DomainError, TestObject};

/// One candidate download run: TLS is negotiated for `host` while the TCP
/// connection goes to `addr`.
#[derive(Debug, Clone)]
pub struct ThroughputTarget {
    pub host: String,
    pub addr: Ipv4Addr,
    pub objects: Arc<[TestObject]>,
    pub min_bytes: u64,
    /// `None` disables the client timeout.
    pub timeout: Option<Duration>,
}

#[async_trait]
pub trait ThroughputProbePort: Send + Sync {
    /// Mean bytes per second. Any transport error or hash mismatch fails the
    /// whole measurement.
    async fn measure(&self, target: &ThroughputTarget) -> Result<f64, DomainError>;
}
