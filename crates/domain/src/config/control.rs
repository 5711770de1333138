use serde::{Deserialize, Serialize};

use super::values::DurationValue;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Shared secret required on every mutating control request.
    #[serde(default)]
    pub secret: Option<String>,

    #[serde(default = "default_header_name")]
    pub header_name: String,

    /// Where a tester process pushes its results.
    #[serde(default)]
    pub push_url: Option<String>,

    #[serde(default = "default_push_retry")]
    pub push_retry: DurationValue,

    #[serde(default = "default_push_attempts")]
    pub push_attempts: u32,

    /// Control API of the running server, used by `steer-dns reload`.
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            secret: None,
            header_name: default_header_name(),
            push_url: None,
            push_retry: default_push_retry(),
            push_attempts: default_push_attempts(),
            server_url: default_server_url(),
        }
    }
}

fn default_header_name() -> String {
    "X-Api-Key".to_string()
}

fn default_push_retry() -> DurationValue {
    DurationValue::from_secs(5)
}

fn default_push_attempts() -> u32 {
    12
}

fn default_server_url() -> String {
    "http://127.0.0.1:8053".to_string()
}
