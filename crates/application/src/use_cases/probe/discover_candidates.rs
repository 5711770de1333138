use crate::ports::{AddressLookupPort, NameserverFeedPort, PassiveDnsPort, PassiveResolution};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use steer_dns_domain::{Candidate, CandidateOrigin, Config, ManagedHostConfig};
use tracing::{debug, info, warn};

/// Inputs to discovery taken from the config at cycle start.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub default_nameservers: Vec<String>,
    pub extra_nameservers: Vec<Vec<String>>,
    pub feed_countries: Vec<String>,
    pub resolve_workers: usize,
    pub passive_dns_enabled: bool,
    pub passive_max_age: Duration,
}

impl DiscoverySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_nameservers: config.dns.nameservers.clone(),
            extra_nameservers: config.probe.resolve_nameservers.clone(),
            feed_countries: config.probe.nameserver_feed_countries.clone(),
            resolve_workers: config.probe.resolve_workers.max(1),
            passive_dns_enabled: config.probe.passive_dns_enabled,
            passive_max_age: config.probe.passive_dns_max_age.as_duration(),
        }
    }
}

pub struct DiscoverCandidatesUseCase {
    lookup: Arc<dyn AddressLookupPort>,
    passive_dns: Option<Arc<dyn PassiveDnsPort>>,
    feed: Option<Arc<dyn NameserverFeedPort>>,
}

impl DiscoverCandidatesUseCase {
    pub fn new(lookup: Arc<dyn AddressLookupPort>) -> Self {
        Self {
            lookup,
            passive_dns: None,
            feed: None,
        }
    }

    pub fn with_passive_dns(mut self, passive_dns: Arc<dyn PassiveDnsPort>) -> Self {
        self.passive_dns = Some(passive_dns);
        self
    }

    pub fn with_nameserver_feed(mut self, feed: Arc<dyn NameserverFeedPort>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Configured groups first, then one single-server group per feed entry.
    /// Addresses are deduplicated by their numeric IPv4 value.
    pub async fn build_nameserver_pool(&self, settings: &DiscoverySettings) -> Vec<Vec<String>> {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut seen_other: HashSet<String> = HashSet::new();
        let mut pool: Vec<Vec<String>> = Vec::new();

        let mut admit = |server: &str| -> bool {
            match nameserver_ipv4(server) {
                Some(ip) => seen.insert(u32::from(ip)),
                None => seen_other.insert(server.to_ascii_lowercase()),
            }
        };

        let configured = std::iter::once(&settings.default_nameservers)
            .chain(settings.extra_nameservers.iter());
        for group in configured {
            let kept: Vec<String> = group.iter().filter(|s| admit(s)).cloned().collect();
            if !kept.is_empty() {
                pool.push(kept);
            }
        }

        if let Some(feed) = &self.feed {
            for country in &settings.feed_countries {
                match feed.fetch(country).await {
                    Ok(servers) => {
                        let before = pool.len();
                        for server in servers {
                            if nameserver_ipv4(&server).is_some() && admit(&server) {
                                pool.push(vec![server]);
                            }
                        }
                        debug!(country = %country, added = pool.len() - before, "Nameserver feed merged");
                    }
                    Err(e) => warn!(country = %country, error = %e, "Nameserver feed unavailable"),
                }
            }
        }

        info!(groups = pool.len(), "Nameserver pool assembled");
        pool
    }

    pub async fn execute(
        &self,
        host: &ManagedHostConfig,
        pool: &[Vec<String>],
        settings: &DiscoverySettings,
    ) -> Vec<Candidate> {
        let candidates = CandidateSet::default();

        self.resolve_into(&host.host, &settings.default_nameservers, CandidateOrigin::Default, &candidates)
            .await;
        if let Some(alias) = &host.live_alias {
            self.resolve_into(alias, &settings.default_nameservers, CandidateOrigin::Live, &candidates)
                .await;
        }

        for aux in &host.aux_hosts {
            if let Ok(ip) = aux.parse::<Ipv4Addr>() {
                candidates.insert(ip, CandidateOrigin::Literal);
                continue;
            }

            stream::iter(pool.iter())
                .for_each_concurrent(settings.resolve_workers, |group| {
                    let candidates = &candidates;
                    async move {
                        match self.lookup.lookup_ipv4(aux, group).await {
                            Ok(addrs) => {
                                for ip in addrs {
                                    candidates.insert(ip, CandidateOrigin::Nameserver(group.clone()));
                                }
                            }
                            Err(e) => {
                                debug!(host = %aux, nameservers = ?group, error = %e, "Lookup failed")
                            }
                        }
                    }
                })
                .await;

            if settings.passive_dns_enabled {
                if let Some(passive) = &self.passive_dns {
                    match passive.resolutions(aux).await {
                        Ok(records) => {
                            let today = Utc::now().date_naive();
                            for ip in fresh_ipv4_resolutions(&records, settings.passive_max_age, today) {
                                candidates.insert(ip, CandidateOrigin::PassiveDns);
                            }
                        }
                        Err(e) => warn!(host = %aux, error = %e, "Passive DNS query failed"),
                    }
                }
            }
        }

        let found = candidates.into_sorted();
        info!(host = %host.host, candidates = found.len(), "Candidate discovery finished");
        found
    }

    async fn resolve_into(
        &self,
        name: &str,
        nameservers: &[String],
        origin: CandidateOrigin,
        candidates: &CandidateSet,
    ) {
        match self.lookup.lookup_ipv4(name, nameservers).await {
            Ok(addrs) => {
                for ip in addrs {
                    candidates.insert(ip, origin.clone());
                }
            }
            Err(e) => warn!(host = %name, origin = %origin, error = %e, "Reference lookup failed"),
        }
    }
}

/// Candidates keyed by numeric address; concurrent inserts from discovery
/// workers land here.
#[derive(Default)]
struct CandidateSet {
    by_addr: DashMap<u32, Candidate>,
    next_order: AtomicUsize,
}

impl CandidateSet {
    fn insert(&self, ip: Ipv4Addr, origin: CandidateOrigin) {
        let key = u32::from(ip);
        let is_default = origin == CandidateOrigin::Default;
        let is_live = origin == CandidateOrigin::Live;
        self.by_addr
            .entry(key)
            .and_modify(|existing| {
                existing.is_default |= is_default;
                existing.is_live |= is_live;
            })
            .or_insert_with(|| {
                let order = self.next_order.fetch_add(1, Ordering::Relaxed);
                Candidate::new(ip, origin, order)
            });
    }

    fn into_sorted(self) -> Vec<Candidate> {
        let mut all: Vec<Candidate> = self.by_addr.into_iter().map(|(_, c)| c).collect();
        all.sort_by_key(|c| c.order);
        all
    }
}

/// IPv4 addresses from passive-DNS records last seen within `max_age` of `today`.
pub fn fresh_ipv4_resolutions(
    records: &[PassiveResolution],
    max_age: Duration,
    today: NaiveDate,
) -> Vec<Ipv4Addr> {
    let max_age_days = (max_age.as_secs() / 86_400) as i64;
    records
        .iter()
        .filter_map(|r| {
            let seen = NaiveDate::parse_from_str(r.last_resolved.trim(), "%Y-%m-%d").ok()?;
            let age = today.signed_duration_since(seen).num_days();
            if age > max_age_days {
                return None;
            }
            r.ip_address.trim().parse::<Ipv4Addr>().ok()
        })
        .collect()
}

fn nameserver_ipv4(server: &str) -> Option<Ipv4Addr> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        };
    }
    server.parse::<Ipv4Addr>().ok()
}
