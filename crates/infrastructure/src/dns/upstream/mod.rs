pub mod exchange;
pub mod policy;
pub mod staggered;

pub use exchange::{DnsExchange, NetworkExchange};
pub use policy::{parse_nameserver, NameserverPolicy};
pub use staggered::{StaggeredResolver, StaggeredResolverConfig};
