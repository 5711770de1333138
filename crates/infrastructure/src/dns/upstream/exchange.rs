use super::policy::parse_nameserver;
use crate::dns::forwarding::ResponseParser;
use crate::dns::transport::UpstreamTransport;
use async_trait::async_trait;
use hickory_proto::op::Message;
use std::time::Duration;
use steer_dns_domain::{DomainError, Transport};

/// One request/response round trip with a single nameserver.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    async fn exchange(
        &self,
        server: &str,
        request: &[u8],
        transport: Transport,
        timeout: Duration,
    ) -> Result<Message, DomainError>;
}

/// Exchange over real UDP/TCP sockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkExchange;

impl NetworkExchange {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DnsExchange for NetworkExchange {
    async fn exchange(
        &self,
        server: &str,
        request: &[u8],
        transport: Transport,
        timeout: Duration,
    ) -> Result<Message, DomainError> {
        let addr = parse_nameserver(server)?;
        let response = UpstreamTransport::new(transport, addr)
            .send(request, timeout)
            .await?;
        ResponseParser::parse(&response.bytes)
    }
}
