use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use std::net::Ipv4Addr;
use steer_dns_domain::DomainError;

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<Message, DomainError> {
        Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })
    }

    /// SERVFAIL ends an attempt without ending the race.
    pub fn is_server_failure(message: &Message) -> bool {
        message.response_code() == ResponseCode::ServFail
    }

    /// A records of the answer section, in order.
    pub fn ipv4_addresses(message: &Message) -> Vec<Ipv4Addr> {
        message
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RData::A(a) => Some(a.0),
                _ => None,
            })
            .collect()
    }
}
