pub mod address_lookup;
pub mod dns_cache_port;
pub mod dns_resolver;
pub mod managed_answers;
pub mod nameserver_feed;
pub mod passive_dns;
pub mod pinger;
pub mod result_store;
pub mod throughput;

pub use address_lookup::AddressLookupPort;
pub use dns_cache_port::{CacheLookup, DnsCachePort};
pub use dns_resolver::UpstreamResolver;
pub use managed_answers::{EndpointPublisher, ManagedAnswerPort};
pub use nameserver_feed::NameserverFeedPort;
pub use passive_dns::{PassiveDnsPort, PassiveResolution};
pub use pinger::{PingStats, PingerPort};
pub use result_store::{ResultSink, ResultStorePort};
pub use throughput::{ThroughputProbePort, ThroughputTarget};
