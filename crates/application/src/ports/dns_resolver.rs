use async_trait::async_trait;
use hickory_proto::op::Message;
use steer_dns_domain::{DomainError, Transport};

/// Forwards a client query to upstream nameservers.
///
/// A returned message is a terminal response: any rcode other than
/// SERVFAIL. Exhausting every nameserver yields
/// `DomainError::ResolutionExhausted`.
#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    async fn resolve(&self, request: &Message, transport: Transport)
        -> Result<Message, DomainError>;
}
