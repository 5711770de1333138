pub mod probe_cycle;
pub mod runner;

pub use probe_cycle::ProbeCycleJob;
pub use runner::JobRunner;
