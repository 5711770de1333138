pub mod cache;
pub mod control;
pub mod dns;
pub mod errors;
pub mod hosts;
pub mod logging;
pub mod paths;
pub mod probe;
pub mod root;
pub mod server;
pub mod values;

pub use cache::CacheConfig;
pub use control::ControlConfig;
pub use dns::{DnsConfig, ManagedNonAPolicy};
pub use errors::ConfigError;
pub use hosts::{ManagedHostConfig, TestObject};
pub use logging::LoggingConfig;
pub use paths::PathsConfig;
pub use probe::{PingPolicy, ProbeConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use values::{ByteSize, DurationValue};
