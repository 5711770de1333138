use super::discover_candidates::{DiscoverCandidatesUseCase, DiscoverySettings};
use super::probe_candidates::{ProbeCandidatesUseCase, ProbeSettings};
use super::select_best::SelectBestUseCase;
use crate::use_cases::results::{PublishOutcome, PublishProbeResultUseCase};
use chrono::Utc;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use steer_dns_domain::{Config, DomainError, HostReport, ManagedHostConfig, ProbeCycleResult};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub hosts_probed: usize,
    pub hosts_selected: usize,
    pub result: Option<ProbeCycleResult>,
    pub publish: Option<PublishOutcome>,
}

/// One full discovery → latency → throughput → select → publish pass over
/// every managed host. Hosts are probed concurrently. At most one pass runs
/// at a time; a second caller is rejected instead of queued.
pub struct RunProbeCycleUseCase {
    config: Arc<RwLock<Config>>,
    discover: Arc<DiscoverCandidatesUseCase>,
    probe: Arc<ProbeCandidatesUseCase>,
    publish: Arc<PublishProbeResultUseCase>,
    running: AtomicBool,
}

impl RunProbeCycleUseCase {
    pub fn new(
        config: Arc<RwLock<Config>>,
        discover: Arc<DiscoverCandidatesUseCase>,
        probe: Arc<ProbeCandidatesUseCase>,
        publish: Arc<PublishProbeResultUseCase>,
    ) -> Self {
        Self {
            config,
            discover,
            probe,
            publish,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn execute(&self) -> Result<CycleReport, DomainError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(DomainError::CycleInProgress);
        }
        let _guard = RunningGuard(&self.running);

        let started = Instant::now();
        let config = self.config.read().await.clone();
        let discovery = DiscoverySettings::from_config(&config);
        let probing = ProbeSettings::from_config(&config);

        let pool = self.discover.build_nameserver_pool(&discovery).await;
        let mut result = ProbeCycleResult::new(Utc::now());

        let reports = join_all(
            config
                .hosts
                .iter()
                .map(|host| self.probe_host(host, &pool, &discovery, &probing)),
        )
        .await;
        for (host, report) in config.hosts.iter().zip(reports) {
            if let Some(report) = report {
                result.detail.insert(host.host.to_ascii_lowercase(), report);
            }
        }

        let mut report = CycleReport {
            hosts_probed: config.hosts.len(),
            hosts_selected: result.detail.len(),
            result: None,
            publish: None,
        };

        if result.is_empty() {
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Probe cycle produced no result, keeping previous records"
            );
            return Ok(report);
        }

        result.updated_at = Utc::now();
        report.publish = Some(self.publish.execute(&result).await);
        report.result = Some(result);

        info!(
            hosts = report.hosts_probed,
            selected = report.hosts_selected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Probe cycle completed"
        );
        Ok(report)
    }

    async fn probe_host(
        &self,
        host: &ManagedHostConfig,
        pool: &[Vec<String>],
        discovery: &DiscoverySettings,
        probing: &ProbeSettings,
    ) -> Option<HostReport> {
        let candidates = self.discover.execute(host, pool, discovery).await;
        let survivors = self.probe.filter_by_latency(candidates, probing).await;
        let measured = self.probe.measure_throughput(host, survivors, probing).await;

        let report = SelectBestUseCase::execute(&measured);
        match &report {
            Some(report) => info!(
                host = %host.host,
                best = %report.best.addr,
                speed = report.best.speed,
                "Best endpoint selected"
            ),
            None => warn!(host = %host.host, "No candidate survived probing"),
        }
        report
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
