use hickory_proto::op::{Message, Query};
use steer_dns_domain::ProbeCycleResult;

/// Synthetic answers for steered hosts.
pub trait ManagedAnswerPort: Send + Sync {
    /// Prepared response for `query` when its name is a published managed
    /// host. The caller only rewrites the transaction ID.
    fn answer(&self, query: &Query) -> Option<Message>;
}

/// Replaces the set of synthetic records with the winners of a cycle.
pub trait EndpointPublisher: Send + Sync {
    /// Returns the number of hosts now published.
    fn publish(&self, result: &ProbeCycleResult) -> usize;

    fn published_hosts(&self) -> Vec<String>;
}
