use hickory_proto::op::Message;
use rustc_hash::FxBuildHasher;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use steer_dns_application::ports::{CacheLookup, DnsCachePort};
use steer_dns_domain::{DomainError, QueryFingerprint};

struct CacheEntry {
    message: Arc<Message>,
    /// `None` for pinned entries.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Response cache keyed by query fingerprint.
///
/// One lock guards the whole map: readers share it, writers are exclusive.
/// Expiry is lazy and happens on `get`.
pub struct DnsCache {
    entries: RwLock<HashMap<QueryFingerprint, CacheEntry, FxBuildHasher>>,
    ttl: Duration,
    max_entries: usize,
}

impl DnsCache {
    /// `max_entries == 0` means unbounded.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity_and_hasher(
                max_entries.min(4096),
                FxBuildHasher,
            )),
            ttl,
            max_entries,
        }
    }

    /// Remove `old` and insert `new` as pinned entries under one write lock.
    /// Capacity is not enforced for the replacement set.
    pub fn replace(&self, old: &[QueryFingerprint], new: Vec<(QueryFingerprint, Message)>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for fingerprint in old {
            entries.remove(fingerprint);
        }
        for (fingerprint, message) in new {
            entries.insert(
                fingerprint,
                CacheEntry {
                    message: Arc::new(message),
                    expires_at: None,
                },
            );
        }
    }
}

impl DnsCachePort for DnsCache {
    fn get(&self, fingerprint: &QueryFingerprint) -> CacheLookup {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(fingerprint) {
                None => return CacheLookup::NotFound,
                Some(entry) if !entry.is_expired(now) => {
                    return CacheLookup::Hit(Arc::clone(&entry.message))
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // A writer may have refreshed the entry between the two locks.
        match entries.get(fingerprint) {
            None => CacheLookup::NotFound,
            Some(entry) if !entry.is_expired(now) => CacheLookup::Hit(Arc::clone(&entry.message)),
            Some(_) => {
                entries.remove(fingerprint);
                CacheLookup::Expired
            }
        }
    }

    fn set(
        &self,
        fingerprint: QueryFingerprint,
        message: Message,
        no_expire: bool,
    ) -> Result<(), DomainError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if self.max_entries > 0
            && entries.len() >= self.max_entries
            && !entries.contains_key(&fingerprint)
        {
            return Err(DomainError::CacheFull);
        }

        let expires_at = (!no_expire).then(|| Instant::now() + self.ttl);
        entries.insert(
            fingerprint,
            CacheEntry {
                message: Arc::new(message),
                expires_at,
            },
        );
        Ok(())
    }

    fn remove(&self, fingerprint: &QueryFingerprint) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(fingerprint)
            .is_some()
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn is_full(&self) -> bool {
        self.max_entries > 0 && self.len() >= self.max_entries
    }
}
