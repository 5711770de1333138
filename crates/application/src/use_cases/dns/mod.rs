pub mod handle_dns_query;

pub use handle_dns_query::{
    failure_response, fingerprint_of, DnsAnswer, HandleDnsQueryUseCase, PendingCacheWrite,
    QueryOutcome,
};
