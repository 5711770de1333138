use std::sync::Arc;
use steer_dns_application::use_cases::HandleDnsQueryUseCase;
use steer_dns_domain::Config;
use steer_dns_infrastructure::dns::upstream::{parse_nameserver, StaggeredResolverConfig};
use steer_dns_infrastructure::dns::{
    DnsCache, DnsServerHandler, NameserverPolicy, NetworkExchange, StaggeredResolver,
    SyntheticRecords,
};
use tracing::{info, warn};

pub struct DnsServices {
    pub synthetic: Arc<SyntheticRecords>,
    pub resolver: Arc<StaggeredResolver>,
    pub handler_use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config) -> Self {
        info!("Initializing DNS services");

        let cache = Arc::new(DnsCache::new(
            config.cache.ttl.as_duration(),
            config.cache.max_entries,
        ));
        let negative_cache = Arc::new(DnsCache::new(
            config.cache.negative_ttl.as_duration(),
            config.cache.negative_max_entries,
        ));
        let synthetic = Arc::new(SyntheticRecords::new(
            config.probe.refresh_interval.as_duration(),
            config.dns.managed_non_a,
        ));
        let resolver = build_resolver(config);

        let handler_use_case = Arc::new(HandleDnsQueryUseCase::new(
            cache,
            negative_cache,
            synthetic.clone(),
            resolver.clone(),
        ));

        info!(
            cache_ttl_secs = config.cache.ttl.as_secs(),
            cache_max_entries = config.cache.max_entries,
            negative_ttl_secs = config.cache.negative_ttl.as_secs(),
            "DNS services ready"
        );

        Self {
            synthetic,
            resolver,
            handler_use_case,
        }
    }

    pub fn handler(&self) -> DnsServerHandler {
        DnsServerHandler::new(self.handler_use_case.clone())
    }
}

/// Staggered resolver over real sockets, shared by query forwarding and
/// candidate discovery.
pub fn build_resolver(config: &Config) -> Arc<StaggeredResolver> {
    let all_servers = config
        .dns
        .nameservers
        .iter()
        .chain(config.dns.domain_nameservers.values().flatten());
    for server in all_servers {
        if let Err(e) = parse_nameserver(server) {
            warn!(nameserver = %server, error = %e, "Nameserver will be skipped at query time");
        }
    }

    let policy = NameserverPolicy::new(config.dns.nameservers.clone())
        .with_overrides(&config.dns.domain_nameservers);
    let resolver_config = StaggeredResolverConfig::from_config(config);

    info!(
        nameservers = ?config.dns.nameservers,
        overrides = config.dns.domain_nameservers.len(),
        timeout_ms = resolver_config.timeout.as_millis() as u64,
        stagger_ms = resolver_config.stagger.as_millis() as u64,
        "Upstream resolver configured"
    );

    Arc::new(StaggeredResolver::new(
        Arc::new(NetworkExchange::new()),
        policy,
        resolver_config,
    ))
}
