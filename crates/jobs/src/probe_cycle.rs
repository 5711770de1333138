use std::sync::Arc;
use std::time::Duration;
use steer_dns_application::use_cases::RunProbeCycleUseCase;
use steer_dns_domain::DomainError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Drives [`RunProbeCycleUseCase`] once at start and then on every refresh
/// interval. Each tick runs the cycle on its own task, so an overrunning
/// cycle makes the next tick hit the single-flight rejection instead of
/// stretching the schedule.
pub struct ProbeCycleJob {
    cycle: Arc<RunProbeCycleUseCase>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ProbeCycleJob {
    pub fn new(cycle: Arc<RunProbeCycleUseCase>, interval: Duration) -> Self {
        Self {
            cycle,
            interval: if interval.is_zero() {
                DEFAULT_INTERVAL
            } else {
                interval
            },
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval.as_secs(), "Starting probe cycle job");

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("ProbeCycleJob: shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let cycle = Arc::clone(&self.cycle);
                    tokio::spawn(async move { run_once(&cycle).await });
                }
            }
        }
    }
}

async fn run_once(cycle: &RunProbeCycleUseCase) {
    match cycle.execute().await {
        Ok(report) => debug!(
            hosts = report.hosts_probed,
            selected = report.hosts_selected,
            "Scheduled probe cycle finished"
        ),
        Err(DomainError::CycleInProgress) => {
            warn!("Previous probe cycle still running, skipping this tick")
        }
        Err(e) => error!(error = %e, "Probe cycle failed"),
    }
}
