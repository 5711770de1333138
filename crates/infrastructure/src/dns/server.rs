use crate::dns::forwarding::MessageBuilder;
use hickory_proto::op::{Message, ResponseCode};
use std::sync::Arc;
use steer_dns_application::use_cases::dns::{failure_response, PendingCacheWrite, QueryOutcome};
use steer_dns_application::use_cases::HandleDnsQueryUseCase;
use steer_dns_domain::Transport;
use tracing::{debug, warn};

/// Plain DNS payload size when the client sent no EDNS.
const MIN_UDP_PAYLOAD: usize = 512;

/// Encoded reply plus the cache write to commit once it has been sent.
pub struct WireResponse {
    pub bytes: Vec<u8>,
    pub outcome: QueryOutcome,
    pending: Option<PendingCacheWrite>,
}

/// Bridges raw datagrams and TCP frames to [`HandleDnsQueryUseCase`].
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// `None` when the request is too short to carry an ID and is dropped.
    pub async fn handle(&self, raw: &[u8], transport: Transport) -> Option<WireResponse> {
        let request = match Message::from_vec(raw) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, bytes = raw.len(), "Undecodable request");
                let reply = MessageBuilder::raw_error_response(raw, ResponseCode::FormErr)?;
                return MessageBuilder::encode(&reply).ok().map(|bytes| WireResponse {
                    bytes,
                    outcome: QueryOutcome::Malformed,
                    pending: None,
                });
            }
        };

        let answer = self.use_case.execute(&request, transport).await;
        let bytes = match MessageBuilder::encode(&answer.message) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to encode reply, answering SERVFAIL");
                let reply = failure_response(&request, ResponseCode::ServFail);
                return MessageBuilder::encode(&reply).ok().map(|bytes| WireResponse {
                    bytes,
                    outcome: QueryOutcome::Failed,
                    pending: None,
                });
            }
        };

        let bytes = if transport == Transport::Udp {
            fit_udp(&request, &answer.message, bytes)
        } else {
            bytes
        };

        Some(WireResponse {
            bytes,
            outcome: answer.outcome,
            pending: answer.pending,
        })
    }

    /// Store the positive cache entry of a reply that has already been sent.
    pub fn commit(&self, response: WireResponse) {
        if let Some(pending) = response.pending {
            self.use_case.store(pending);
        }
    }
}

fn fit_udp(request: &Message, response: &Message, bytes: Vec<u8>) -> Vec<u8> {
    let limit = usize::from(request.max_payload()).max(MIN_UDP_PAYLOAD);
    if bytes.len() <= limit {
        return bytes;
    }

    debug!(size = bytes.len(), limit, "Reply exceeds UDP payload, truncating");
    MessageBuilder::encode(&MessageBuilder::truncated(response)).unwrap_or(bytes)
}
