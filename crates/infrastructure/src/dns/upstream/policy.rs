use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use steer_dns_domain::{dns_query::normalize_name, DomainError};

const DEFAULT_DNS_PORT: u16 = 53;

/// Picks the upstream list for a query name: the longest configured domain
/// suffix wins, otherwise the global default list.
#[derive(Debug, Clone, Default)]
pub struct NameserverPolicy {
    default: Vec<String>,
    overrides: BTreeMap<String, Vec<String>>,
}

impl NameserverPolicy {
    pub fn new(default: Vec<String>) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        self.overrides = overrides
            .iter()
            .map(|(suffix, servers)| (suffix_key(suffix), servers.clone()))
            .collect();
        self
    }

    pub fn nameservers_for(&self, qname: &str) -> &[String] {
        let name = suffix_key(qname);
        let mut candidate = name.as_str();
        loop {
            if let Some(servers) = self.overrides.get(candidate) {
                return servers;
            }
            match candidate.split_once('.') {
                Some((_, parent)) if !parent.is_empty() => candidate = parent,
                _ => return &self.default,
            }
        }
    }
}

fn suffix_key(name: &str) -> String {
    normalize_name(name).trim_end_matches('.').to_string()
}

/// `1.1.1.1`, `1.1.1.1:5353`, `2001:db8::1` or `[2001:db8::1]:53`.
pub fn parse_nameserver(server: &str) -> Result<SocketAddr, DomainError> {
    let server = server.trim();
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    server
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
        .map_err(|_| DomainError::InvalidIpAddress(format!("Invalid nameserver '{}'", server)))
}
