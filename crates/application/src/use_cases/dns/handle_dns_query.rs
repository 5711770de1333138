use crate::ports::{CacheLookup, DnsCachePort, ManagedAnswerPort, UpstreamResolver};
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, RecordType};
use std::sync::Arc;
use steer_dns_domain::{DomainError, QueryFingerprint, Transport};
use tracing::{debug, warn};

/// Path a request took through the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Hijacked,
    CacheHit,
    NegativeCacheHit,
    Resolved,
    Failed,
    Malformed,
}

/// Positive entry to store once the response has been sent.
#[derive(Debug, Clone)]
pub struct PendingCacheWrite {
    pub fingerprint: QueryFingerprint,
    pub message: Message,
}

#[derive(Debug, Clone)]
pub struct DnsAnswer {
    pub message: Message,
    pub outcome: QueryOutcome,
    pub pending: Option<PendingCacheWrite>,
}

impl DnsAnswer {
    fn immediate(message: Message, outcome: QueryOutcome) -> Self {
        Self {
            message,
            outcome,
            pending: None,
        }
    }
}

pub struct HandleDnsQueryUseCase {
    cache: Arc<dyn DnsCachePort>,
    negative_cache: Arc<dyn DnsCachePort>,
    managed: Arc<dyn ManagedAnswerPort>,
    resolver: Arc<dyn UpstreamResolver>,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        cache: Arc<dyn DnsCachePort>,
        negative_cache: Arc<dyn DnsCachePort>,
        managed: Arc<dyn ManagedAnswerPort>,
        resolver: Arc<dyn UpstreamResolver>,
    ) -> Self {
        Self {
            cache,
            negative_cache,
            managed,
            resolver,
        }
    }

    /// Produce the reply for `request`. A positive cache write, if any, is
    /// returned in `pending` and must be committed with [`Self::store`] after
    /// the reply has gone out.
    pub async fn execute(&self, request: &Message, transport: Transport) -> DnsAnswer {
        let Some(query) = request.queries().first().cloned() else {
            return DnsAnswer::immediate(
                failure_response(request, ResponseCode::FormErr),
                QueryOutcome::Malformed,
            );
        };

        if let Some(mut synthetic) = self.managed.answer(&query) {
            synthetic.set_id(request.id());
            debug!(name = %query.name(), qtype = %query.query_type(), "Answered managed host");
            return DnsAnswer::immediate(synthetic, QueryOutcome::Hijacked);
        }

        let fingerprint = fingerprint_of(&query);
        let cacheable = is_cacheable(&query);

        if cacheable {
            match self.cache.get(&fingerprint) {
                CacheLookup::Hit(cached) => {
                    let mut response = (*cached).clone();
                    response.set_id(request.id());
                    debug!(query = %fingerprint, "Cache hit");
                    return DnsAnswer::immediate(response, QueryOutcome::CacheHit);
                }
                CacheLookup::Expired | CacheLookup::NotFound => {
                    if self.negative_cache.get(&fingerprint).is_hit() {
                        debug!(query = %fingerprint, "Negative cache hit");
                        return DnsAnswer::immediate(
                            failure_response(request, ResponseCode::ServFail),
                            QueryOutcome::NegativeCacheHit,
                        );
                    }
                }
            }
        }

        match self.resolver.resolve(request, transport).await {
            Ok(mut response) => {
                response.set_id(request.id());
                let pending = (cacheable && !response.answers().is_empty()).then(|| {
                    PendingCacheWrite {
                        fingerprint,
                        message: response.clone(),
                    }
                });
                DnsAnswer {
                    message: response,
                    outcome: QueryOutcome::Resolved,
                    pending,
                }
            }
            Err(e) => {
                warn!(query = %fingerprint, transport = %transport, error = %e, "Resolution failed");
                let response = failure_response(request, ResponseCode::ServFail);
                if cacheable {
                    self.record_failure(fingerprint, response.clone());
                }
                DnsAnswer::immediate(response, QueryOutcome::Failed)
            }
        }
    }

    /// Commit a positive cache entry. A full cache is logged and skipped.
    pub fn store(&self, pending: PendingCacheWrite) {
        match self.cache.set(pending.fingerprint.clone(), pending.message, false) {
            Ok(()) => {}
            Err(DomainError::CacheFull) => {
                debug!(query = %pending.fingerprint, "Cache full, skipping insert");
            }
            Err(e) => warn!(query = %pending.fingerprint, error = %e, "Cache insert failed"),
        }
    }

    fn record_failure(&self, fingerprint: QueryFingerprint, response: Message) {
        if let Err(e) = self.negative_cache.set(fingerprint.clone(), response, false) {
            debug!(query = %fingerprint, error = %e, "Negative cache insert skipped");
        }
    }
}

pub fn fingerprint_of(query: &Query) -> QueryFingerprint {
    QueryFingerprint::new(
        &query.name().to_ascii(),
        query.query_type(),
        query.query_class(),
    )
}

fn is_cacheable(query: &Query) -> bool {
    query.query_class() == DNSClass::IN
        && matches!(query.query_type(), RecordType::A | RecordType::AAAA)
}

/// Empty reply to `request` carrying `code`.
pub fn failure_response(request: &Message, code: ResponseCode) -> Message {
    let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
    response.set_recursion_desired(request.recursion_desired());
    response.set_recursion_available(true);
    response.set_response_code(code);
    for query in request.queries() {
        response.add_query(query.clone());
    }
    response
}
