use super::cache::DnsCache;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{rdata, DNSClass, Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use steer_dns_application::ports::{CacheLookup, DnsCachePort, EndpointPublisher, ManagedAnswerPort};
use steer_dns_domain::{ManagedNonAPolicy, ProbeCycleResult, QueryFingerprint};
use tracing::{info, warn};

const ANSWERED_TYPES: [RecordType; 3] = [RecordType::A, RecordType::AAAA, RecordType::CNAME];

struct Published {
    hosts: Vec<String>,
    fingerprints: Vec<QueryFingerprint>,
}

/// Pinned answers for steered hosts.
///
/// A publish swaps the whole set under one write lock on the backing store,
/// so a concurrent reader sees either the old set or the new one.
pub struct SyntheticRecords {
    store: DnsCache,
    published: Mutex<Published>,
    record_ttl: u32,
    non_a_policy: ManagedNonAPolicy,
}

impl SyntheticRecords {
    /// `refresh_interval` becomes the TTL advertised in published A records.
    pub fn new(refresh_interval: Duration, non_a_policy: ManagedNonAPolicy) -> Self {
        Self {
            store: DnsCache::new(Duration::ZERO, 0),
            published: Mutex::new(Published {
                hosts: Vec::new(),
                fingerprints: Vec::new(),
            }),
            record_ttl: ttl_secs(refresh_interval),
            non_a_policy,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn host_answers(
        &self,
        host: &str,
        addr: Ipv4Addr,
        ttl: u32,
    ) -> Option<Vec<(QueryFingerprint, Message)>> {
        let name = match Name::from_str(host) {
            Ok(name) => name,
            Err(e) => {
                warn!(host = %host, error = %e, "Skipping unpublishable host name");
                return None;
            }
        };

        let answers = ANSWERED_TYPES
            .iter()
            .map(|&record_type| {
                let mut message = response_skeleton(&name, record_type);
                if record_type == RecordType::A {
                    message.add_answer(Record::from_rdata(name.clone(), ttl, RData::A(rdata::A(addr))));
                } else if self.non_a_policy == ManagedNonAPolicy::NxDomain {
                    message.set_response_code(ResponseCode::NXDomain);
                }
                (
                    QueryFingerprint::new(host, record_type, DNSClass::IN),
                    message,
                )
            })
            .collect();
        Some(answers)
    }
}

fn ttl_secs(interval: Duration) -> u32 {
    u32::try_from(interval.as_secs()).unwrap_or(u32::MAX)
}

fn response_skeleton(name: &Name, record_type: RecordType) -> Message {
    let mut query = Query::new();
    query.set_name(name.clone());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(0, MessageType::Response, OpCode::Query);
    message.set_authoritative(true);
    message.set_recursion_desired(true);
    message.set_recursion_available(true);
    message.set_response_code(ResponseCode::NoError);
    message.add_query(query);
    message
}

impl ManagedAnswerPort for SyntheticRecords {
    fn answer(&self, query: &Query) -> Option<Message> {
        if query.query_class() != DNSClass::IN || !ANSWERED_TYPES.contains(&query.query_type()) {
            return None;
        }
        let fingerprint = QueryFingerprint::new(
            &query.name().to_ascii(),
            query.query_type(),
            query.query_class(),
        );
        match self.store.get(&fingerprint) {
            CacheLookup::Hit(message) => Some((*message).clone()),
            _ => None,
        }
    }
}

impl EndpointPublisher for SyntheticRecords {
    fn publish(&self, result: &ProbeCycleResult) -> usize {
        let ttl = self.record_ttl;
        let mut hosts = Vec::new();
        let mut entries = Vec::new();
        for (host, addr) in result.best_addresses() {
            if let Some(answers) = self.host_answers(host, addr, ttl) {
                hosts.push(host.to_string());
                entries.extend(answers);
            }
        }
        let fingerprints: Vec<QueryFingerprint> =
            entries.iter().map(|(fp, _)| fp.clone()).collect();

        let mut published = self.published.lock().unwrap_or_else(|e| e.into_inner());
        self.store.replace(&published.fingerprints, entries);
        published.fingerprints = fingerprints;
        published.hosts = hosts;

        info!(hosts = published.hosts.len(), ttl, "Synthetic records published");
        published.hosts.len()
    }

    fn published_hosts(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .hosts
            .clone()
    }
}
