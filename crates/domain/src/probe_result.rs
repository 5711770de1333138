use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::candidate::Candidate;

/// Measurement of one endpoint: `ping` in milliseconds, `speed` in bytes/second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointReport {
    pub addr: Ipv4Addr,
    #[serde(default)]
    pub ping: f64,
    #[serde(default)]
    pub speed: f64,
}

impl From<&Candidate> for EndpointReport {
    fn from(c: &Candidate) -> Self {
        Self {
            addr: c.addr,
            ping: c.ping_millis(),
            speed: c.throughput,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<EndpointReport>,
    pub best: EndpointReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<EndpointReport>,
}

/// Outcome of one probe cycle across all managed hosts. Replaced wholesale by
/// the next cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeCycleResult {
    pub updated_at: DateTime<Utc>,
    pub detail: BTreeMap<String, HostReport>,
}

impl ProbeCycleResult {
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at,
            detail: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }

    /// Host name to the address it should be steered to.
    pub fn best_addresses(&self) -> impl Iterator<Item = (&str, Ipv4Addr)> {
        self.detail
            .iter()
            .map(|(host, report)| (host.as_str(), report.best.addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_json_shape() {
        let mut result = ProbeCycleResult::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        result.detail.insert(
            "example.test".to_string(),
            HostReport {
                default: Some(EndpointReport {
                    addr: Ipv4Addr::new(192, 0, 2, 1),
                    ping: 12.5,
                    speed: 1000.0,
                }),
                best: EndpointReport {
                    addr: Ipv4Addr::new(192, 0, 2, 9),
                    ping: 4.0,
                    speed: 9000.0,
                },
                live: None,
            },
        );

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        let host = &json["detail"]["example.test"];
        assert_eq!(host["best"]["addr"], "192.0.2.9");
        assert_eq!(host["default"]["ping"], 12.5);
        assert!(host.get("live").is_none());
        assert!(json["updated_at"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));

        let back: ProbeCycleResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
