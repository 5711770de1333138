use std::sync::Arc;
use steer_dns_application::ports::ResultStorePort;
use steer_dns_application::use_cases::{
    PublishProbeResultUseCase, ReloadConfigUseCase, RunProbeCycleUseCase,
};
use steer_dns_domain::config::ControlConfig;

/// Shared secret checked on mutating requests. Without one every mutating
/// request is refused.
#[derive(Clone, Debug)]
pub struct ControlAuth {
    pub secret: Option<Arc<str>>,
    pub header_name: Arc<str>,
}

impl ControlAuth {
    pub fn from_config(control: &ControlConfig) -> Self {
        Self {
            secret: control
                .secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Arc::from),
            header_name: Arc::from(control.header_name.as_str()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub reload_config: Arc<ReloadConfigUseCase>,
    pub publish_result: Arc<PublishProbeResultUseCase>,
    pub result_store: Option<Arc<dyn ResultStorePort>>,
    pub probe_cycle: Option<Arc<RunProbeCycleUseCase>>,
    pub auth: ControlAuth,
}
