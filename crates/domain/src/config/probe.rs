use serde::{Deserialize, Serialize};

use super::values::{ByteSize, DurationValue};

/// How the latency phase treats packet loss and slow candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PingPolicy {
    /// Every echo request must be answered.
    #[default]
    Strict,
    /// Drop candidates whose mean RTT exceeds `ping_relative_factor` times the
    /// mean of all candidates that answered.
    Relative,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Run probe cycles inside this process.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: DurationValue,

    #[serde(default = "default_resolve_workers")]
    pub resolve_workers: usize,

    #[serde(default = "default_ping_workers")]
    pub ping_workers: usize,

    #[serde(default = "default_http_workers")]
    pub http_workers: usize,

    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: DurationValue,

    #[serde(default)]
    pub ping_policy: PingPolicy,

    #[serde(default = "default_ping_relative_factor")]
    pub ping_relative_factor: f64,

    /// Client timeout for candidate downloads. Default and live candidates
    /// are measured without one.
    #[serde(default = "default_http_timeout")]
    pub http_timeout: DurationValue,

    /// Bytes to download per candidate before computing throughput.
    #[serde(default = "default_http_min_bytes")]
    pub http_min_bytes: ByteSize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_true")]
    pub passive_dns_enabled: bool,

    #[serde(default = "default_passive_dns_url")]
    pub passive_dns_url: String,

    /// Passive-DNS resolutions last seen longer ago than this are ignored.
    #[serde(default = "default_passive_dns_max_age")]
    pub passive_dns_max_age: DurationValue,

    #[serde(default = "default_nameserver_feed_url")]
    pub nameserver_feed_url: String,

    #[serde(default = "default_nameserver_feed_countries")]
    pub nameserver_feed_countries: Vec<String>,

    /// Extra nameserver groups used during brute-force resolution.
    #[serde(default)]
    pub resolve_nameservers: Vec<Vec<String>>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: default_refresh_interval(),
            resolve_workers: default_resolve_workers(),
            ping_workers: default_ping_workers(),
            http_workers: default_http_workers(),
            ping_count: default_ping_count(),
            ping_timeout: default_ping_timeout(),
            ping_policy: PingPolicy::default(),
            ping_relative_factor: default_ping_relative_factor(),
            http_timeout: default_http_timeout(),
            http_min_bytes: default_http_min_bytes(),
            user_agent: default_user_agent(),
            passive_dns_enabled: true,
            passive_dns_url: default_passive_dns_url(),
            passive_dns_max_age: default_passive_dns_max_age(),
            nameserver_feed_url: default_nameserver_feed_url(),
            nameserver_feed_countries: default_nameserver_feed_countries(),
            resolve_nameservers: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval() -> DurationValue {
    DurationValue::from_secs(600)
}

fn default_resolve_workers() -> usize {
    64
}

fn default_ping_workers() -> usize {
    16
}

fn default_http_workers() -> usize {
    4
}

fn default_ping_count() -> u32 {
    5
}

fn default_ping_timeout() -> DurationValue {
    DurationValue::from_secs(1)
}

fn default_ping_relative_factor() -> f64 {
    1.5
}

fn default_http_timeout() -> DurationValue {
    DurationValue::from_secs(10)
}

fn default_http_min_bytes() -> ByteSize {
    ByteSize::from_mib(8)
}

fn default_user_agent() -> String {
    format!("steer-dns/{}", env!("CARGO_PKG_VERSION"))
}

fn default_passive_dns_url() -> String {
    "https://www.threatcrowd.org".to_string()
}

fn default_passive_dns_max_age() -> DurationValue {
    DurationValue::from_secs(30 * 86_400)
}

fn default_nameserver_feed_url() -> String {
    "https://public-dns.info".to_string()
}

fn default_nameserver_feed_countries() -> Vec<String> {
    vec!["kr".to_string(), "jp".to_string()]
}
