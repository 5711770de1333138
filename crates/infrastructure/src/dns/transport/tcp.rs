//! TCP transport for upstream queries. Every message is prefixed with its
//! length as a big-endian u16 (RFC 1035 §4.2.2).

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use steer_dns_domain::DomainError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn failure(&self, reason: impl ToString) -> DomainError {
        DomainError::TransportFailure {
            server: self.server_addr.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let exchange = async {
            let mut stream = TcpStream::connect(self.server_addr)
                .await
                .map_err(|e| self.failure(format!("connect: {}", e)))?;
            stream
                .set_nodelay(true)
                .map_err(|e| self.failure(format!("TCP_NODELAY: {}", e)))?;

            send_with_length_prefix(&mut stream, message_bytes).await?;
            debug!(server = %self.server_addr, message_len = message_bytes.len(), "TCP query sent");

            read_with_length_prefix(&mut stream).await
        };

        let response_bytes = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })??;

        debug!(
            server = %self.server_addr,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::SerializationError(format!(
            "DNS message too large for TCP: {} bytes",
            message_bytes.len()
        ))
    })?;

    stream
        .write_all(&length.to_be_bytes())
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write length prefix: {}", e)))?;
    stream
        .write_all(message_bytes)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

pub async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message length: {}", e)))?;

    let message_len = u16::from_be_bytes(len_buf) as usize;

    let mut message = vec![0u8; message_len];
    stream
        .read_exact(&mut message)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message body: {}", e)))?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_length_prefix_framing() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        send_with_length_prefix(&mut client, &[0xde, 0xad, 0xbe, 0xef])
            .await
            .unwrap();

        let received = read_with_length_prefix(&mut server).await.unwrap();
        assert_eq!(received, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[tokio::test]
    async fn test_short_stream_is_io_error() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(&[0x00, 0x10, 0x01]).await.unwrap();
        drop(client);

        let result = read_with_length_prefix(&mut server).await;
        assert!(matches!(result, Err(DomainError::IoError(_))));
    }
}
