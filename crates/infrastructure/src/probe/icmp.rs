//! ICMP echo pinger.
//!
//! Prefers an unprivileged ICMP datagram socket (Linux `ping_group_range`)
//! and falls back to a raw socket. Each run is blocking and lives on the
//! blocking pool.

use async_trait::async_trait;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{ErrorKind, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};
use steer_dns_application::ports::{PingStats, PingerPort};
use steer_dns_domain::DomainError;
use tracing::debug;

const ECHO_REQUEST: u8 = 8;
const ECHO_REPLY: u8 = 0;
const HEADER_LEN: usize = 8;
const PAYLOAD: &[u8; 16] = b"steer-dns-probe!";

#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpPinger;

impl IcmpPinger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PingerPort for IcmpPinger {
    async fn ping(
        &self,
        addr: Ipv4Addr,
        count: u32,
        timeout: Duration,
    ) -> Result<PingStats, DomainError> {
        tokio::task::spawn_blocking(move || ping_blocking(addr, count, timeout))
            .await
            .map_err(|e| DomainError::ProbeFailed {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?
    }
}

fn open_socket(addr: Ipv4Addr) -> Result<Socket, DomainError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))
        .or_else(|_| Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)))
        .map_err(|e| DomainError::ProbeFailed {
            addr: addr.to_string(),
            reason: format!("ICMP socket unavailable: {}", e),
        })?;
    socket
        .connect(&SockAddr::from(SocketAddrV4::new(addr, 0)))
        .map_err(|e| DomainError::ProbeFailed {
            addr: addr.to_string(),
            reason: format!("connect: {}", e),
        })?;
    Ok(socket)
}

fn ping_blocking(addr: Ipv4Addr, count: u32, timeout: Duration) -> Result<PingStats, DomainError> {
    let socket = open_socket(addr)?;
    let identifier = fastrand::u16(..);
    let mut stats = PingStats {
        sent: 0,
        received: 0,
        mean_rtt: None,
    };
    let mut total_rtt = Duration::ZERO;

    for seq in 0..count {
        let seq = seq as u16;
        let packet = echo_request(identifier, seq);
        stats.sent += 1;
        if let Err(e) = socket.send(&packet) {
            debug!(addr = %addr, seq, error = %e, "ICMP send failed");
            continue;
        }

        let started = Instant::now();
        if let Some(rtt) = await_reply(&socket, seq, started, timeout) {
            stats.received += 1;
            total_rtt += rtt;
        }
    }

    if stats.received > 0 {
        stats.mean_rtt = Some(total_rtt / stats.received);
    }
    debug!(
        addr = %addr,
        sent = stats.sent,
        received = stats.received,
        mean_rtt_ms = stats.mean_rtt.map(|d| d.as_secs_f64() * 1000.0),
        "Ping finished"
    );
    Ok(stats)
}

fn await_reply(socket: &Socket, seq: u16, started: Instant, timeout: Duration) -> Option<Duration> {
    let mut buf = [0u8; 1500];
    loop {
        let remaining = timeout.checked_sub(started.elapsed())?;
        if remaining.is_zero() || socket.set_read_timeout(Some(remaining)).is_err() {
            return None;
        }
        let mut reader = socket;
        match reader.read(&mut buf) {
            Ok(len) => {
                if is_reply_to(&buf[..len], seq) {
                    return Some(started.elapsed());
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted) => {}
            Err(_) => return None,
        }
    }
}

/// Echo request with a valid checksum. The kernel rewrites the identifier
/// on datagram sockets, so replies are matched on sequence only.
fn echo_request(identifier: u16, seq: u16) -> Vec<u8> {
    let mut packet = Vec::with_capacity(HEADER_LEN + PAYLOAD.len());
    packet.extend_from_slice(&[ECHO_REQUEST, 0, 0, 0]);
    packet.extend_from_slice(&identifier.to_be_bytes());
    packet.extend_from_slice(&seq.to_be_bytes());
    packet.extend_from_slice(PAYLOAD);

    let sum = checksum(&packet);
    packet[2..4].copy_from_slice(&sum.to_be_bytes());
    packet
}

fn is_reply_to(datagram: &[u8], seq: u16) -> bool {
    // Raw sockets deliver the IPv4 header as well.
    let icmp = if datagram.first().is_some_and(|b| b >> 4 == 4) {
        let header_len = usize::from(datagram[0] & 0x0f) * 4;
        match datagram.get(header_len..) {
            Some(rest) => rest,
            None => return false,
        }
    } else {
        datagram
    };

    icmp.len() >= HEADER_LEN
        && icmp[0] == ECHO_REPLY
        && u16::from_be_bytes([icmp[6], icmp[7]]) == seq
}

fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = data
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u32::from(u16::from_be_bytes([*hi, *lo])),
            [hi] => u32::from(*hi) << 8,
            _ => 0,
        })
        .sum();
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
