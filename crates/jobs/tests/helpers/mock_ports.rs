#![allow(dead_code)]

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steer_dns_application::ports::{
    AddressLookupPort, EndpointPublisher, PingStats, PingerPort, ThroughputProbePort,
    ThroughputTarget,
};
use steer_dns_application::use_cases::{
    DiscoverCandidatesUseCase, ProbeCandidatesUseCase, PublishProbeResultUseCase,
    RunProbeCycleUseCase,
};
use steer_dns_domain::{Config, DomainError, ManagedHostConfig, ProbeCycleResult, TestObject};
use tokio::sync::RwLock;

pub const HOST: &str = "media.example.test";
pub const HOST_IP: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 10);
/// Literal aux address, so it never goes through lookup.
pub const CANDIDATE_IP: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 20);

/// Every lookup answers [`HOST_IP`]; one lookup per cycle.
#[derive(Default)]
pub struct CountingLookup {
    calls: AtomicUsize,
}

impl CountingLookup {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressLookupPort for CountingLookup {
    async fn lookup_ipv4(
        &self,
        _host: &str,
        _nameservers: &[String],
    ) -> Result<Vec<Ipv4Addr>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![HOST_IP])
    }
}

/// Lossless pinger that can be slowed down to stretch a cycle.
#[derive(Default)]
pub struct SlowPinger {
    delay: Mutex<Duration>,
}

impl SlowPinger {
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl PingerPort for SlowPinger {
    async fn ping(
        &self,
        _addr: Ipv4Addr,
        count: u32,
        _timeout: Duration,
    ) -> Result<PingStats, DomainError> {
        let delay = *self.delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        Ok(PingStats {
            sent: count,
            received: count,
            mean_rtt: Some(Duration::from_millis(5)),
        })
    }
}

pub struct FixedThroughput;

#[async_trait]
impl ThroughputProbePort for FixedThroughput {
    async fn measure(&self, _target: &ThroughputTarget) -> Result<f64, DomainError> {
        Ok(1_000_000.0)
    }
}

#[derive(Default)]
pub struct CountingPublisher {
    published: AtomicUsize,
}

impl CountingPublisher {
    pub fn publish_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

impl EndpointPublisher for CountingPublisher {
    fn publish(&self, result: &ProbeCycleResult) -> usize {
        self.published.fetch_add(1, Ordering::SeqCst);
        result.detail.len()
    }

    fn published_hosts(&self) -> Vec<String> {
        vec![HOST.to_string()]
    }
}

pub struct CycleHarness {
    pub lookup: Arc<CountingLookup>,
    pub pinger: Arc<SlowPinger>,
    pub publisher: Arc<CountingPublisher>,
    pub cycle: Arc<RunProbeCycleUseCase>,
}

impl CycleHarness {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.dns.nameservers = vec!["192.0.2.53:53".to_string()];
        config.probe.passive_dns_enabled = false;
        config.hosts = vec![ManagedHostConfig::new(HOST)
            .with_aux_hosts(vec![CANDIDATE_IP.to_string()])
            .with_tests(vec![TestObject::new(
                "https://media.example.test/probe.bin",
                "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3",
            )])];

        let lookup = Arc::new(CountingLookup::default());
        let pinger = Arc::new(SlowPinger::default());
        let publisher = Arc::new(CountingPublisher::default());

        let cycle = RunProbeCycleUseCase::new(
            Arc::new(RwLock::new(config)),
            Arc::new(DiscoverCandidatesUseCase::new(lookup.clone())),
            Arc::new(ProbeCandidatesUseCase::new(
                pinger.clone(),
                Arc::new(FixedThroughput),
            )),
            Arc::new(PublishProbeResultUseCase::new().with_publisher(publisher.clone())),
        );

        Self {
            lookup,
            pinger,
            publisher,
            cycle: Arc::new(cycle),
        }
    }
}
