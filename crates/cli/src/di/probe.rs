use std::sync::Arc;
use steer_dns_application::ports::{AddressLookupPort, EndpointPublisher, ResultStorePort};
use steer_dns_application::use_cases::{
    DiscoverCandidatesUseCase, ProbeCandidatesUseCase, PublishProbeResultUseCase,
    RunProbeCycleUseCase,
};
use steer_dns_domain::Config;
use steer_dns_infrastructure::control::{ControlClient, HttpResultPusher};
use steer_dns_infrastructure::persistence::{JsonResultStore, ZoneFileWriter};
use steer_dns_infrastructure::probe::{
    api_client, HttpThroughputProbe, IcmpPinger, NameserverFeedClient, PassiveDnsClient,
};
use tokio::sync::RwLock;
use tracing::info;

/// Where probe results go once a cycle finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Results feed the local synthetic records.
    Server,
    /// Results are pushed to a remote server's control API.
    Tester,
}

pub struct ProbeServices {
    pub store: Arc<JsonResultStore>,
    pub publish: Arc<PublishProbeResultUseCase>,
    pub cycle: Arc<RunProbeCycleUseCase>,
}

impl ProbeServices {
    pub fn new(
        config: &Config,
        shared_config: Arc<RwLock<Config>>,
        lookup: Arc<dyn AddressLookupPort>,
        publisher: Option<Arc<dyn EndpointPublisher>>,
        deployment: Deployment,
    ) -> anyhow::Result<Self> {
        let probe = &config.probe;
        let client = api_client(&probe.user_agent, probe.http_timeout.as_duration())?;

        let discover = DiscoverCandidatesUseCase::new(lookup)
            .with_passive_dns(Arc::new(PassiveDnsClient::new(
                client.clone(),
                probe.passive_dns_url.clone(),
            )))
            .with_nameserver_feed(Arc::new(NameserverFeedClient::new(
                client,
                probe.nameserver_feed_url.clone(),
            )));

        let measure = ProbeCandidatesUseCase::new(
            Arc::new(IcmpPinger::new()),
            Arc::new(HttpThroughputProbe::new(probe.user_agent.clone())),
        );

        let store = Arc::new(JsonResultStore::new(&config.paths.result_file));
        let mut publish = PublishProbeResultUseCase::new()
            .with_store(store.clone() as Arc<dyn ResultStorePort>);

        if let Some(publisher) = publisher {
            publish = publish.with_publisher(publisher);
        }

        if let (Some(template), Some(output)) =
            (&config.paths.zone_template, &config.paths.zone_output)
        {
            info!(template = %template, output = %output, "Zone file output enabled");
            publish = publish.with_sink(Arc::new(ZoneFileWriter::new(
                template,
                output,
                config.paths.reload_commands.clone(),
            )));
        }

        if deployment == Deployment::Tester {
            let control = &config.control;
            let push_url = control
                .push_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("control.push_url is required in probe mode"))?;
            let client = ControlClient::new(
                push_url.clone(),
                control.header_name.clone(),
                control.secret.clone(),
                probe.http_timeout.as_duration(),
            )?;
            info!(push_url = %push_url, attempts = control.push_attempts, "Result push enabled");
            publish = publish.with_sink(Arc::new(HttpResultPusher::new(
                client,
                control.push_retry.as_duration(),
                control.push_attempts,
            )));
        }

        let publish = Arc::new(publish);
        let cycle = Arc::new(RunProbeCycleUseCase::new(
            shared_config,
            Arc::new(discover),
            Arc::new(measure),
            publish.clone(),
        ));

        Ok(Self {
            store,
            publish,
            cycle,
        })
    }
}
