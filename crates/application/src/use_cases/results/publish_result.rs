use crate::ports::{EndpointPublisher, ResultSink, ResultStorePort};
use std::sync::Arc;
use steer_dns_domain::{DomainError, ProbeCycleResult};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub hosts_published: usize,
    pub persisted: bool,
    pub failed_sinks: Vec<&'static str>,
}

/// Hands a finished cycle result to the synthetic-record publisher, the
/// result store and every downstream sink. Sink failures are logged and
/// never undo the publish.
pub struct PublishProbeResultUseCase {
    publisher: Option<Arc<dyn EndpointPublisher>>,
    store: Option<Arc<dyn ResultStorePort>>,
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl PublishProbeResultUseCase {
    pub fn new() -> Self {
        Self {
            publisher: None,
            store: None,
            sinks: Vec::new(),
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EndpointPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStorePort>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub async fn execute(&self, result: &ProbeCycleResult) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        if let Some(publisher) = &self.publisher {
            outcome.hosts_published = publisher.publish(result);
        }

        if let Some(store) = &self.store {
            match store.save(result).await {
                Ok(()) => outcome.persisted = true,
                Err(e) => error!(error = %e, "Failed to persist probe result"),
            }
        }

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(result).await {
                warn!(sink = sink.name(), error = %e, "Result sink failed");
                outcome.failed_sinks.push(sink.name());
            }
        }

        info!(
            hosts = outcome.hosts_published,
            persisted = outcome.persisted,
            failed_sinks = outcome.failed_sinks.len(),
            "Probe result published"
        );
        outcome
    }

    /// Publish the persisted result, if any, without touching sinks.
    pub async fn warm_up(&self) -> Result<usize, DomainError> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let Some(result) = store.load().await? else {
            info!("No persisted probe result to pre-warm from");
            return Ok(0);
        };
        let published = self
            .publisher
            .as_ref()
            .map(|p| p.publish(&result))
            .unwrap_or(0);
        info!(hosts = published, updated_at = %result.updated_at, "Synthetic records pre-warmed");
        Ok(published)
    }
}

impl Default for PublishProbeResultUseCase {
    fn default() -> Self {
        Self::new()
    }
}
