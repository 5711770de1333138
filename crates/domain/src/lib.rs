//! Steer DNS Domain Layer
pub mod candidate;
pub mod config;
pub mod dns_query;
pub mod errors;
pub mod probe_result;

pub use candidate::{Candidate, CandidateOrigin};
pub use config::{
    ByteSize, CliOverrides, Config, ConfigError, DurationValue, ManagedHostConfig,
    ManagedNonAPolicy, PingPolicy, TestObject,
};
pub use dns_query::{QueryFingerprint, Transport};
pub use errors::DomainError;
pub use probe_result::{EndpointReport, HostReport, ProbeCycleResult};
