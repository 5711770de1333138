//! UDP transport for upstream queries (RFC 1035 §4.2.1).
//!
//! Messages travel without framing. A response with the TC bit set is
//! returned as-is; the client retries over TCP.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use steer_dns_domain::DomainError;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

const MAX_UDP_RESPONSE_SIZE: usize = 65_535;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    fn failure(&self, reason: impl ToString) -> DomainError {
        DomainError::TransportFailure {
            server: self.server_addr.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| self.failure(format!("bind: {}", e)))?;
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| self.failure(format!("connect: {}", e)))?;

        let exchange = async {
            let bytes_sent = socket.send(message_bytes).await?;
            debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

            let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
            let bytes_received = socket.recv(&mut recv_buf).await?;
            recv_buf.truncate(bytes_received);
            Ok::<_, std::io::Error>(recv_buf)
        };

        let recv_buf = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })?
            .map_err(|e| self.failure(e))?;

        if recv_buf.len() < 2 || recv_buf[..2] != message_bytes[..2.min(message_bytes.len())] {
            warn!(server = %self.server_addr, "UDP response with mismatched transaction ID");
            return Err(self.failure("mismatched transaction ID"));
        }

        debug!(
            server = %self.server_addr,
            bytes_received = recv_buf.len(),
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
