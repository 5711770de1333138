pub mod discover_candidates;
pub mod probe_candidates;
pub mod run_probe_cycle;
pub mod select_best;

pub use discover_candidates::{fresh_ipv4_resolutions, DiscoverCandidatesUseCase, DiscoverySettings};
pub use probe_candidates::{apply_ping_policy, ProbeCandidatesUseCase, ProbeSettings};
pub use run_probe_cycle::{CycleReport, RunProbeCycleUseCase};
pub use select_best::SelectBestUseCase;
