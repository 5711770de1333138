use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// How a candidate address was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOrigin {
    /// Answer from the default nameservers for the managed host.
    Default,
    /// Answer from the default nameservers for the live alias.
    Live,
    /// Answer from one nameserver group during brute-force resolution.
    Nameserver(Vec<String>),
    /// Historical association reported by passive DNS.
    PassiveDns,
    /// Auxiliary host given as a literal address.
    Literal,
}

impl fmt::Display for CandidateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Live => f.write_str("live"),
            Self::Nameserver(servers) => write!(f, "ns:{}", servers.join(",")),
            Self::PassiveDns => f.write_str("passive-dns"),
            Self::Literal => f.write_str("literal"),
        }
    }
}

/// An address under consideration for one managed host during one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub addr: Ipv4Addr,
    pub origin: CandidateOrigin,
    pub is_default: bool,
    pub is_live: bool,
    /// Position in discovery order, used to break throughput ties.
    pub order: usize,
    pub ping: Option<Duration>,
    /// Mean bytes per second; 0 until measured or after a failed probe.
    pub throughput: f64,
}

impl Candidate {
    pub fn new(addr: Ipv4Addr, origin: CandidateOrigin, order: usize) -> Self {
        let is_default = origin == CandidateOrigin::Default;
        let is_live = origin == CandidateOrigin::Live;
        Self {
            addr,
            origin,
            is_default,
            is_live,
            order,
            ping: None,
            throughput: 0.0,
        }
    }

    /// 32-bit key used to deduplicate addresses across discovery sources.
    pub fn key(&self) -> u32 {
        u32::from(self.addr)
    }

    /// Default and live candidates are measured for comparison only and are
    /// never dropped or selected.
    pub fn is_reference(&self) -> bool {
        self.is_default || self.is_live
    }

    pub fn ping_millis(&self) -> f64 {
        self.ping.map(|d| d.as_secs_f64() * 1000.0).unwrap_or(0.0)
    }
}
