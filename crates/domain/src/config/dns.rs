use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::values::DurationValue;

/// Reply given to AAAA and CNAME questions for a steered host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManagedNonAPolicy {
    /// NOERROR with an empty answer section.
    #[default]
    Empty,
    /// NXDOMAIN.
    NxDomain,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Global default upstream list, tried in order by the racing resolver.
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<String>,

    /// Domain suffix to preferred upstream list. Longest suffix wins.
    #[serde(default)]
    pub domain_nameservers: BTreeMap<String, Vec<String>>,

    /// Per-attempt exchange timeout.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout: DurationValue,

    /// Stagger between launching consecutive upstream attempts.
    #[serde(default = "default_lookup_interval")]
    pub lookup_interval: DurationValue,

    /// UDP payload size advertised through EDNS0 on upstream queries.
    #[serde(default = "default_edns_payload")]
    pub edns_payload: u16,

    #[serde(default)]
    pub managed_non_a: ManagedNonAPolicy,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            nameservers: default_nameservers(),
            domain_nameservers: BTreeMap::new(),
            lookup_timeout: default_lookup_timeout(),
            lookup_interval: default_lookup_interval(),
            edns_payload: default_edns_payload(),
            managed_non_a: ManagedNonAPolicy::default(),
        }
    }
}

fn default_nameservers() -> Vec<String> {
    vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()]
}

fn default_lookup_timeout() -> DurationValue {
    DurationValue::from_secs(3)
}

fn default_lookup_interval() -> DurationValue {
    DurationValue::from_millis(300)
}

fn default_edns_payload() -> u16 {
    4096
}
