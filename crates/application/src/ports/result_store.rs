use async_trait::async_trait;
use steer_dns_domain::{DomainError, ProbeCycleResult};

/// Durable copy of the last cycle result.
#[async_trait]
pub trait ResultStorePort: Send + Sync {
    async fn load(&self) -> Result<Option<ProbeCycleResult>, DomainError>;

    async fn save(&self, result: &ProbeCycleResult) -> Result<(), DomainError>;
}

/// Downstream consumer of a published result (zone file, remote server).
#[async_trait]
pub trait ResultSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, result: &ProbeCycleResult) -> Result<(), DomainError>;
}
