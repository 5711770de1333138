use hickory_proto::op::Message;
use std::sync::Arc;
use steer_dns_domain::{DomainError, QueryFingerprint};

/// Result of a cache read. `Expired` is distinct from `NotFound` so callers
/// can decide whether to fall through to the negative cache.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit(Arc<Message>),
    Expired,
    NotFound,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Bounded, TTL-based store of decoded DNS responses.
pub trait DnsCachePort: Send + Sync {
    fn get(&self, fingerprint: &QueryFingerprint) -> CacheLookup;

    /// Fails with `DomainError::CacheFull` only when the store is at capacity
    /// and the key is new.
    fn set(
        &self,
        fingerprint: QueryFingerprint,
        message: Message,
        no_expire: bool,
    ) -> Result<(), DomainError>;

    fn remove(&self, fingerprint: &QueryFingerprint) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool;
}
