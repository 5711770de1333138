//! DNS Message Builder
//!
//! Constructs and serializes DNS messages with `hickory-proto`.

use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;
use steer_dns_domain::DomainError;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Recursive IN query with a random ID and a single question.
    pub fn build_query(domain: &str, record_type: RecordType) -> Result<Message, DomainError> {
        let name = Name::from_str(domain).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);
        Ok(message)
    }

    /// Advertise `payload` bytes of UDP buffer through an OPT record,
    /// replacing whatever EDNS section the message carried.
    pub fn attach_edns(message: &mut Message, payload: u16) {
        let mut edns = Edns::new();
        edns.set_max_payload(payload.max(512));
        message.set_edns(edns);
    }

    /// Error reply for a request that could not be decoded, addressed by the
    /// raw transaction ID. `None` when not even the ID is present.
    pub fn raw_error_response(raw: &[u8], code: ResponseCode) -> Option<Message> {
        let id = u16::from_be_bytes([*raw.first()?, *raw.get(1)?]);
        let mut response = Message::new(id, MessageType::Response, OpCode::Query);
        response.set_response_code(code);
        Some(response)
    }

    /// Header plus question with the TC bit set, for answers too large for
    /// the client's UDP buffer.
    pub fn truncated(response: &Message) -> Message {
        let mut stub = Message::new(response.id(), MessageType::Response, response.op_code());
        stub.set_recursion_desired(response.recursion_desired());
        stub.set_recursion_available(response.recursion_available());
        stub.set_authoritative(response.authoritative());
        stub.set_response_code(response.response_code());
        stub.set_truncated(true);
        for query in response.queries() {
            stub.add_query(query.clone());
        }
        stub
    }

    pub fn encode(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::SerializationError(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
