use super::client::ControlClient;
use async_trait::async_trait;
use std::time::Duration;
use steer_dns_application::ports::ResultSink;
use steer_dns_domain::{DomainError, ProbeCycleResult};
use tracing::{info, warn};

/// Delivers results from a tester process to the serving process, retrying
/// on a fixed interval.
pub struct HttpResultPusher {
    client: ControlClient,
    retry: Duration,
    attempts: u32,
}

impl HttpResultPusher {
    pub fn new(client: ControlClient, retry: Duration, attempts: u32) -> Self {
        Self {
            client,
            retry,
            attempts: attempts.max(1),
        }
    }
}

#[async_trait]
impl ResultSink for HttpResultPusher {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn deliver(&self, result: &ProbeCycleResult) -> Result<(), DomainError> {
        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match self.client.push_result(result).await {
                Ok(()) => {
                    info!(attempt, hosts = result.detail.len(), "Probe result pushed");
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, attempts = self.attempts, error = %e, "Result push failed");
                    last_error = Some(e);
                }
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.retry).await;
            }
        }
        Err(last_error.unwrap_or_else(|| DomainError::HttpError("result push failed".into())))
    }
}
