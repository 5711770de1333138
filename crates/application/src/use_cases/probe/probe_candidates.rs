use crate::ports::{PingStats, PingerPort, ThroughputProbePort, ThroughputTarget};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use steer_dns_domain::{Candidate, Config, ManagedHostConfig, PingPolicy, TestObject};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub ping_count: u32,
    pub ping_timeout: Duration,
    pub ping_workers: usize,
    pub ping_policy: PingPolicy,
    pub ping_relative_factor: f64,
    pub http_workers: usize,
    pub http_timeout: Duration,
    pub http_min_bytes: u64,
}

impl ProbeSettings {
    pub fn from_config(config: &Config) -> Self {
        let probe = &config.probe;
        Self {
            ping_count: probe.ping_count,
            ping_timeout: probe.ping_timeout.as_duration(),
            ping_workers: probe.ping_workers.max(1),
            ping_policy: probe.ping_policy,
            ping_relative_factor: probe.ping_relative_factor,
            http_workers: probe.http_workers.max(1),
            http_timeout: probe.http_timeout.as_duration(),
            http_min_bytes: probe.http_min_bytes.as_u64(),
        }
    }
}

pub struct ProbeCandidatesUseCase {
    pinger: Arc<dyn PingerPort>,
    throughput: Arc<dyn ThroughputProbePort>,
}

impl ProbeCandidatesUseCase {
    pub fn new(pinger: Arc<dyn PingerPort>, throughput: Arc<dyn ThroughputProbePort>) -> Self {
        Self { pinger, throughput }
    }

    /// Latency phase. Default and live candidates always survive.
    pub async fn filter_by_latency(
        &self,
        candidates: Vec<Candidate>,
        settings: &ProbeSettings,
    ) -> Vec<Candidate> {
        let total = candidates.len();
        let measured: Vec<(Candidate, PingStats)> = stream::iter(candidates)
            .map(|mut candidate| async move {
                let stats = match self
                    .pinger
                    .ping(candidate.addr, settings.ping_count, settings.ping_timeout)
                    .await
                {
                    Ok(stats) => stats,
                    Err(e) => {
                        debug!(addr = %candidate.addr, error = %e, "Ping failed");
                        PingStats {
                            sent: settings.ping_count,
                            ..PingStats::default()
                        }
                    }
                };
                candidate.ping = stats.mean_rtt;
                (candidate, stats)
            })
            .buffer_unordered(settings.ping_workers)
            .collect()
            .await;

        let mut kept = apply_ping_policy(measured, settings.ping_policy, settings.ping_relative_factor);
        kept.sort_by_key(|c| c.order);
        info!(total, kept = kept.len(), policy = ?settings.ping_policy, "Latency phase finished");
        kept
    }

    /// Throughput phase. Non-reference candidates with no usable measurement
    /// are dropped.
    pub async fn measure_throughput(
        &self,
        host: &ManagedHostConfig,
        candidates: Vec<Candidate>,
        settings: &ProbeSettings,
    ) -> Vec<Candidate> {
        let objects: Arc<[TestObject]> = host.tests.clone().into();
        let total = candidates.len();

        let mut measured: Vec<Candidate> = stream::iter(candidates)
            .map(|mut candidate| {
                let target = ThroughputTarget {
                    host: host.host.clone(),
                    addr: candidate.addr,
                    objects: objects.clone(),
                    min_bytes: settings.http_min_bytes,
                    timeout: (!candidate.is_reference()).then_some(settings.http_timeout),
                };
                async move {
                    candidate.throughput = match self.throughput.measure(&target).await {
                        Ok(speed) => speed,
                        Err(e) => {
                            debug!(host = %target.host, addr = %target.addr, error = %e, "Throughput probe failed");
                            0.0
                        }
                    };
                    candidate
                }
            })
            .buffer_unordered(settings.http_workers)
            .filter(|c| std::future::ready(c.is_reference() || c.throughput > 0.0))
            .collect()
            .await;

        measured.sort_by_key(|c| c.order);
        info!(host = %host.host, total, kept = measured.len(), "Throughput phase finished");
        measured
    }
}

/// Keep candidates allowed by `policy`. `factor` only applies to
/// `PingPolicy::Relative`.
pub fn apply_ping_policy(
    measured: Vec<(Candidate, PingStats)>,
    policy: PingPolicy,
    factor: f64,
) -> Vec<Candidate> {
    match policy {
        PingPolicy::Strict => measured
            .into_iter()
            .filter(|(c, stats)| c.is_reference() || stats.lossless())
            .map(|(c, _)| c)
            .collect(),
        PingPolicy::Relative => {
            let answered: Vec<f64> = measured
                .iter()
                .filter_map(|(_, s)| s.mean_rtt.map(|d| d.as_secs_f64()))
                .collect();
            let mean = if answered.is_empty() {
                0.0
            } else {
                answered.iter().sum::<f64>() / answered.len() as f64
            };
            let limit = mean * factor;
            measured
                .into_iter()
                .filter(|(c, stats)| {
                    c.is_reference()
                        || stats
                            .mean_rtt
                            .map(|rtt| rtt.as_secs_f64() <= limit)
                            .unwrap_or(false)
                })
                .map(|(c, _)| c)
                .collect()
        }
    }
}
