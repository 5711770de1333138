#![allow(dead_code)]
#![allow(unused_imports)]

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{rdata, DNSClass, Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steer_dns_application::ports::{
    AddressLookupPort, CacheLookup, DnsCachePort, EndpointPublisher, ManagedAnswerPort,
    NameserverFeedPort, PassiveDnsPort, PassiveResolution, PingStats, PingerPort, ResultSink,
    ResultStorePort, ThroughputProbePort, ThroughputTarget, UpstreamResolver,
};
use steer_dns_domain::{DomainError, ProbeCycleResult, QueryFingerprint, Transport};

// ── message builders ───────────────────────────────────────────────────────

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    message
}

pub fn answer_message(request: &Message, ips: &[Ipv4Addr], code: ResponseCode) -> Message {
    let mut response = Message::new(request.id(), MessageType::Response, OpCode::Query);
    response.set_response_code(code);
    let query = request.queries()[0].clone();
    let name = query.name().clone();
    response.add_query(query);
    for ip in ips {
        response.add_answer(Record::from_rdata(name.clone(), 300, RData::A(rdata::A(*ip))));
    }
    response
}

// ── cache ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockDnsCache {
    entries: Mutex<HashMap<QueryFingerprint, Arc<Message>>>,
    expired: Mutex<Vec<QueryFingerprint>>,
    full: Mutex<bool>,
    set_calls: AtomicUsize,
}

impl MockDnsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, fingerprint: QueryFingerprint, message: Message) {
        self.entries
            .lock()
            .unwrap()
            .insert(fingerprint, Arc::new(message));
    }

    pub fn mark_expired(&self, fingerprint: QueryFingerprint) {
        self.expired.lock().unwrap().push(fingerprint);
    }

    pub fn set_full(&self, full: bool) {
        *self.full.lock().unwrap() = full;
    }

    pub fn contains(&self, fingerprint: &QueryFingerprint) -> bool {
        self.entries.lock().unwrap().contains_key(fingerprint)
    }

    pub fn set_call_count(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }
}

impl DnsCachePort for MockDnsCache {
    fn get(&self, fingerprint: &QueryFingerprint) -> CacheLookup {
        let mut expired = self.expired.lock().unwrap();
        if let Some(pos) = expired.iter().position(|f| f == fingerprint) {
            expired.remove(pos);
            self.entries.lock().unwrap().remove(fingerprint);
            return CacheLookup::Expired;
        }
        match self.entries.lock().unwrap().get(fingerprint) {
            Some(message) => CacheLookup::Hit(message.clone()),
            None => CacheLookup::NotFound,
        }
    }

    fn set(
        &self,
        fingerprint: QueryFingerprint,
        message: Message,
        _no_expire: bool,
    ) -> Result<(), DomainError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        if *self.full.lock().unwrap() && !entries.contains_key(&fingerprint) {
            return Err(DomainError::CacheFull);
        }
        entries.insert(fingerprint, Arc::new(message));
        Ok(())
    }

    fn remove(&self, fingerprint: &QueryFingerprint) -> bool {
        self.entries.lock().unwrap().remove(fingerprint).is_some()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn is_full(&self) -> bool {
        *self.full.lock().unwrap()
    }
}

// ── managed answers ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockManagedAnswers {
    answers: Mutex<HashMap<(String, RecordType), Message>>,
}

impl MockManagedAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_a(&self, host: &str, ip: Ipv4Addr, ttl: u32) {
        let request = query_message(0, host, RecordType::A);
        let mut response = answer_message(&request, &[], ResponseCode::NoError);
        response.set_authoritative(true);
        response.add_answer(Record::from_rdata(
            Name::from_str(host).unwrap(),
            ttl,
            RData::A(rdata::A(ip)),
        ));
        self.answers
            .lock()
            .unwrap()
            .insert((normalize(host), RecordType::A), response);

        for empty_type in [RecordType::AAAA, RecordType::CNAME] {
            let request = query_message(0, host, empty_type);
            let response = answer_message(&request, &[], ResponseCode::NoError);
            self.answers
                .lock()
                .unwrap()
                .insert((normalize(host), empty_type), response);
        }
    }
}

impl ManagedAnswerPort for MockManagedAnswers {
    fn answer(&self, query: &Query) -> Option<Message> {
        self.answers
            .lock()
            .unwrap()
            .get(&(normalize(&query.name().to_ascii()), query.query_type()))
            .cloned()
    }
}

fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

// ── upstream resolver ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockUpstreamResolver {
    answers: Mutex<HashMap<String, (Vec<Ipv4Addr>, ResponseCode)>>,
    failing: Mutex<Vec<String>>,
    calls: AtomicUsize,
    transports: Mutex<Vec<Transport>>,
}

impl MockUpstreamResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&self, name: &str, ips: Vec<Ipv4Addr>) {
        self.answers
            .lock()
            .unwrap()
            .insert(normalize(name), (ips, ResponseCode::NoError));
    }

    pub fn set_rcode(&self, name: &str, code: ResponseCode) {
        self.answers
            .lock()
            .unwrap()
            .insert(normalize(name), (Vec::new(), code));
    }

    pub fn set_failure(&self, name: &str) {
        self.failing.lock().unwrap().push(normalize(name));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn transports(&self) -> Vec<Transport> {
        self.transports.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamResolver for MockUpstreamResolver {
    async fn resolve(
        &self,
        request: &Message,
        transport: Transport,
    ) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transports.lock().unwrap().push(transport);

        let name = normalize(&request.queries()[0].name().to_ascii());
        if self.failing.lock().unwrap().contains(&name) {
            return Err(DomainError::ResolutionExhausted {
                qname: name,
                transport: transport.to_string(),
                nameservers: vec!["192.0.2.53:53".to_string()],
            });
        }
        let answer = self.answers.lock().unwrap().get(&name).cloned();
        match answer {
            Some((ips, code)) => Ok(answer_message(request, &ips, code)),
            None => Ok(answer_message(request, &[], ResponseCode::NXDomain)),
        }
    }
}

// ── discovery ──────────────────────────────────────────────────────────────

/// Answers keyed by host and the first nameserver of the queried group;
/// `"*"` matches any group.
#[derive(Default)]
pub struct MockAddressLookup {
    answers: Mutex<HashMap<(String, String), Vec<Ipv4Addr>>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockAddressLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&self, host: &str, nameserver: &str, ips: Vec<Ipv4Addr>) {
        self.answers
            .lock()
            .unwrap()
            .insert((host.to_string(), nameserver.to_string()), ips);
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AddressLookupPort for MockAddressLookup {
    async fn lookup_ipv4(
        &self,
        host: &str,
        nameservers: &[String],
    ) -> Result<Vec<Ipv4Addr>, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((host.to_string(), nameservers.to_vec()));
        let first = nameservers.first().cloned().unwrap_or_default();
        let answers = self.answers.lock().unwrap();
        answers
            .get(&(host.to_string(), first))
            .or_else(|| answers.get(&(host.to_string(), "*".to_string())))
            .cloned()
            .ok_or_else(|| DomainError::NotFound(host.to_string()))
    }
}

#[derive(Default)]
pub struct MockPassiveDns {
    records: Mutex<HashMap<String, Vec<PassiveResolution>>>,
}

impl MockPassiveDns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_records(&self, host: &str, records: Vec<PassiveResolution>) {
        self.records
            .lock()
            .unwrap()
            .insert(host.to_string(), records);
    }
}

#[async_trait]
impl PassiveDnsPort for MockPassiveDns {
    async fn resolutions(&self, host: &str) -> Result<Vec<PassiveResolution>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockNameserverFeed {
    lists: Mutex<HashMap<String, Vec<String>>>,
}

impl MockNameserverFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_list(&self, country: &str, servers: Vec<&str>) {
        self.lists.lock().unwrap().insert(
            country.to_string(),
            servers.into_iter().map(String::from).collect(),
        );
    }
}

#[async_trait]
impl NameserverFeedPort for MockNameserverFeed {
    async fn fetch(&self, country: &str) -> Result<Vec<String>, DomainError> {
        self.lists
            .lock()
            .unwrap()
            .get(country)
            .cloned()
            .ok_or_else(|| DomainError::HttpError(format!("no feed for {}", country)))
    }
}

// ── probing ────────────────────────────────────────────────────────────────

/// Every address answers every packet in 10ms unless configured otherwise.
#[derive(Default)]
pub struct MockPinger {
    overrides: Mutex<HashMap<Ipv4Addr, (u32, Option<Duration>)>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockPinger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_lost(&self, addr: Ipv4Addr, lost: u32) {
        self.overrides
            .lock()
            .unwrap()
            .insert(addr, (lost, Some(Duration::from_millis(10))));
    }

    pub fn set_rtt(&self, addr: Ipv4Addr, rtt: Duration) {
        self.overrides.lock().unwrap().insert(addr, (0, Some(rtt)));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PingerPort for MockPinger {
    async fn ping(
        &self,
        addr: Ipv4Addr,
        count: u32,
        _timeout: Duration,
    ) -> Result<PingStats, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let (lost, rtt) = self
            .overrides
            .lock()
            .unwrap()
            .get(&addr)
            .cloned()
            .unwrap_or((0, Some(Duration::from_millis(10))));
        let received = count.saturating_sub(lost);
        Ok(PingStats {
            sent: count,
            received,
            mean_rtt: if received > 0 { rtt } else { None },
        })
    }
}

#[derive(Default)]
pub struct MockThroughputProbe {
    speeds: Mutex<HashMap<Ipv4Addr, f64>>,
    targets: Mutex<Vec<ThroughputTarget>>,
}

impl MockThroughputProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_speed(&self, addr: Ipv4Addr, bytes_per_sec: f64) {
        self.speeds.lock().unwrap().insert(addr, bytes_per_sec);
    }

    pub fn targets(&self) -> Vec<ThroughputTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThroughputProbePort for MockThroughputProbe {
    async fn measure(&self, target: &ThroughputTarget) -> Result<f64, DomainError> {
        self.targets.lock().unwrap().push(target.clone());
        self.speeds
            .lock()
            .unwrap()
            .get(&target.addr)
            .copied()
            .ok_or_else(|| DomainError::HashMismatch {
                url: format!("https://{}/", target.host),
            })
    }
}

// ── publishing ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPublisher {
    published: Mutex<Vec<ProbeCycleResult>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<ProbeCycleResult> {
        self.published.lock().unwrap().clone()
    }
}

impl EndpointPublisher for MockPublisher {
    fn publish(&self, result: &ProbeCycleResult) -> usize {
        self.published.lock().unwrap().push(result.clone());
        result.detail.len()
    }

    fn published_hosts(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .last()
            .map(|r| r.detail.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct MockResultStore {
    stored: Mutex<Option<ProbeCycleResult>>,
    saves: AtomicUsize,
}

impl MockResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(result: ProbeCycleResult) -> Self {
        Self {
            stored: Mutex::new(Some(result)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<ProbeCycleResult> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStorePort for MockResultStore {
    async fn load(&self) -> Result<Option<ProbeCycleResult>, DomainError> {
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, result: &ProbeCycleResult) -> Result<(), DomainError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock().unwrap() = Some(result.clone());
        Ok(())
    }
}

pub struct MockSink {
    name: &'static str,
    fail: bool,
    deliveries: AtomicUsize,
}

impl MockSink {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fail: false,
            deliveries: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultSink for MockSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, _result: &ProbeCycleResult) -> Result<(), DomainError> {
        self.deliveries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::IoError("sink unavailable".to_string()));
        }
        Ok(())
    }
}
