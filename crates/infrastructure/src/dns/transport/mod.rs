pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use steer_dns_domain::{DomainError, Transport};

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum UpstreamTransport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl UpstreamTransport {
    pub fn new(transport: Transport, server_addr: SocketAddr) -> Self {
        match transport {
            Transport::Udp => Self::Udp(udp::UdpTransport::new(server_addr)),
            Transport::Tcp => Self::Tcp(tcp::TcpTransport::new(server_addr)),
        }
    }

    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(t) => t.protocol_name(),
            Self::Tcp(t) => t.protocol_name(),
        }
    }
}
