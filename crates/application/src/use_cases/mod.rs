pub mod config;
pub mod dns;
pub mod probe;
pub mod results;

pub use config::ReloadConfigUseCase;
pub use dns::{DnsAnswer, HandleDnsQueryUseCase, PendingCacheWrite, QueryOutcome};
pub use probe::{
    CycleReport, DiscoverCandidatesUseCase, DiscoverySettings, ProbeCandidatesUseCase,
    ProbeSettings, RunProbeCycleUseCase, SelectBestUseCase,
};
pub use results::{PublishOutcome, PublishProbeResultUseCase};
