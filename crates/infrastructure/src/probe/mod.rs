pub mod http;
pub mod icmp;
pub mod nameserver_feed;
pub mod passive_dns;

pub use http::{ContentHasher, HttpThroughputProbe};
pub use icmp::IcmpPinger;
pub use nameserver_feed::NameserverFeedClient;
pub use passive_dns::PassiveDnsClient;

use std::time::Duration;
use steer_dns_domain::DomainError;

/// Shared client for the JSON collaborators.
pub fn api_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, DomainError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| DomainError::HttpError(e.to_string()))
}
