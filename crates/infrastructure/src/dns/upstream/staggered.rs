//! Staggered upstream race.
//!
//! Nameservers are launched one at a time, one stagger interval apart. The
//! first terminal answer (any rcode but SERVFAIL) wins; attempts still in
//! flight are left to finish on their own and their results are dropped.

use super::exchange::DnsExchange;
use super::policy::NameserverPolicy;
use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use async_trait::async_trait;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use steer_dns_application::ports::{AddressLookupPort, UpstreamResolver};
use steer_dns_domain::{Config, DomainError, Transport};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct StaggeredResolverConfig {
    /// Per-attempt exchange timeout.
    pub timeout: Duration,
    /// Delay before the next nameserver joins the race.
    pub stagger: Duration,
    pub edns_payload: u16,
}

impl StaggeredResolverConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.dns.lookup_timeout.as_duration(),
            stagger: config.dns.lookup_interval.as_duration(),
            edns_payload: config.dns.edns_payload,
        }
    }
}

pub struct StaggeredResolver {
    exchange: Arc<dyn DnsExchange>,
    policy: NameserverPolicy,
    config: StaggeredResolverConfig,
}

impl StaggeredResolver {
    pub fn new(
        exchange: Arc<dyn DnsExchange>,
        policy: NameserverPolicy,
        config: StaggeredResolverConfig,
    ) -> Self {
        Self {
            exchange,
            policy,
            config,
        }
    }

    /// Race `request` across `nameservers` in order.
    pub async fn race(
        &self,
        request: &Message,
        transport: Transport,
        nameservers: &[String],
    ) -> Result<Message, DomainError> {
        let qname = request
            .queries()
            .first()
            .map(|q| q.name().to_ascii())
            .unwrap_or_default();

        if nameservers.is_empty() {
            return Err(DomainError::NoNameservers(qname));
        }

        let mut outgoing = request.clone();
        if transport == Transport::Udp {
            MessageBuilder::attach_edns(&mut outgoing, self.config.edns_payload);
        }
        let bytes: Arc<[u8]> = MessageBuilder::encode(&outgoing)?.into();

        let exhausted = || DomainError::ResolutionExhausted {
            qname: qname.clone(),
            transport: transport.to_string(),
            nameservers: nameservers.to_vec(),
        };

        if let [server] = nameservers {
            return attempt(
                self.exchange.as_ref(),
                server,
                &bytes,
                transport,
                self.config.timeout,
            )
            .await
            .ok_or_else(exhausted);
        }

        // Single slot: only the first winner is ever read, later senders
        // find the slot full (or the receiver gone) and give up.
        let (tx, mut rx) = mpsc::channel::<Message>(1);
        let stagger = self.config.stagger.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + stagger, stagger);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let last = nameservers.len() - 1;
        for (i, server) in nameservers.iter().enumerate() {
            let exchange = Arc::clone(&self.exchange);
            let server = server.clone();
            let bytes = Arc::clone(&bytes);
            let tx = tx.clone();
            let timeout = self.config.timeout;
            tokio::spawn(async move {
                if let Some(response) =
                    attempt(exchange.as_ref(), &server, &bytes, transport, timeout).await
                {
                    let _ = tx.try_send(response);
                }
            });

            if i == last {
                break;
            }
            tokio::select! {
                Some(response) = rx.recv() => return Ok(response),
                _ = ticker.tick() => {}
            }
        }

        // Every attempt holds a sender; the channel closes once all of them
        // have finished without an answer.
        drop(tx);
        rx.recv().await.ok_or_else(exhausted)
    }
}

async fn attempt(
    exchange: &dyn DnsExchange,
    server: &str,
    request: &[u8],
    transport: Transport,
    timeout: Duration,
) -> Option<Message> {
    match exchange.exchange(server, request, transport, timeout).await {
        Ok(response) if ResponseParser::is_server_failure(&response) => {
            debug!(server = %server, "Upstream answered SERVFAIL");
            None
        }
        Ok(response) => Some(response),
        Err(e) => {
            debug!(server = %server, error = %e, "Upstream attempt failed");
            None
        }
    }
}

#[async_trait]
impl UpstreamResolver for StaggeredResolver {
    async fn resolve(
        &self,
        request: &Message,
        transport: Transport,
    ) -> Result<Message, DomainError> {
        let qname = request
            .queries()
            .first()
            .map(|q| q.name().to_ascii())
            .ok_or_else(|| DomainError::InvalidDnsResponse("query without question".into()))?;
        let nameservers = self.policy.nameservers_for(&qname);
        self.race(request, transport, nameservers).await
    }
}

#[async_trait]
impl AddressLookupPort for StaggeredResolver {
    async fn lookup_ipv4(
        &self,
        host: &str,
        nameservers: &[String],
    ) -> Result<Vec<Ipv4Addr>, DomainError> {
        let request = MessageBuilder::build_query(host, RecordType::A)?;
        let response = self.race(&request, Transport::Udp, nameservers).await?;
        Ok(ResponseParser::ipv4_addresses(&response))
    }
}
