pub mod dns_server_mock;
pub mod http_server_mock;
pub mod scripted_exchange;

pub use dns_server_mock::{MockDnsServer, MockReply};
pub use http_server_mock::MockHttpServer;
pub use scripted_exchange::{query, Script, ScriptedExchange};
