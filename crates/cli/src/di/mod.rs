pub mod dns;
pub mod probe;

pub use dns::DnsServices;
pub use probe::{Deployment, ProbeServices};
