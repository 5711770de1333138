#![allow(dead_code)]
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{rdata, DNSClass, Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use steer_dns_domain::{DomainError, Transport};
use steer_dns_infrastructure::dns::DnsExchange;
use tokio::time::Instant;

pub fn query(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    message
}

/// What one nameserver does after `delay`.
#[derive(Debug, Clone)]
pub enum Script {
    Answer(Duration, Ipv4Addr),
    Code(Duration, ResponseCode),
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub server: String,
    pub transport: Transport,
    pub request: Message,
    pub started: Instant,
}

/// In-memory nameservers with per-server scripted behaviour.
#[derive(Default)]
pub struct ScriptedExchange {
    scripts: Mutex<HashMap<String, Script>>,
    attempts: Mutex<Vec<Attempt>>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, server: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(server.to_string(), script);
        self
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_servers(&self) -> Vec<String> {
        self.attempts().into_iter().map(|a| a.server).collect()
    }
}

#[async_trait]
impl DnsExchange for ScriptedExchange {
    async fn exchange(
        &self,
        server: &str,
        request: &[u8],
        transport: Transport,
        timeout: Duration,
    ) -> Result<Message, DomainError> {
        let request = Message::from_vec(request).unwrap();
        self.attempts.lock().unwrap().push(Attempt {
            server: server.to_string(),
            transport,
            request: request.clone(),
            started: Instant::now(),
        });

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(server)
            .cloned()
            .unwrap_or(Script::Timeout(timeout));

        let mut response = Message::new(request.id(), MessageType::Response, OpCode::Query);
        for q in request.queries() {
            response.add_query(q.clone());
        }

        match script {
            Script::Timeout(delay) => {
                tokio::time::sleep(delay.min(timeout)).await;
                Err(DomainError::TransportTimeout {
                    server: server.to_string(),
                })
            }
            Script::Code(delay, code) => {
                tokio::time::sleep(delay).await;
                response.set_response_code(code);
                Ok(response)
            }
            Script::Answer(delay, ip) => {
                tokio::time::sleep(delay).await;
                let name = request.queries()[0].name().clone();
                response.add_answer(Record::from_rdata(name, 60, RData::A(rdata::A(ip))));
                Ok(response)
            }
        }
    }
}
