pub mod cache;
pub mod forwarding;
pub mod server;
pub mod synthetic;
pub mod transport;
pub mod upstream;

pub use cache::DnsCache;
pub use server::{DnsServerHandler, WireResponse};
pub use synthetic::SyntheticRecords;
pub use upstream::{DnsExchange, NameserverPolicy, NetworkExchange, StaggeredResolver};
