use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use steer_dns_api::{AppState, ControlAuth};
use steer_dns_application::ports::{EndpointPublisher, ResultStorePort};
use steer_dns_application::use_cases::ReloadConfigUseCase;
use steer_dns_domain::{CliOverrides, Config};
use steer_dns_infrastructure::control::ControlClient;
use steer_dns_jobs::{JobRunner, ProbeCycleJob};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "steer-dns")]
#[command(version)]
#[command(about = "Steer DNS - forwarding DNS server that answers managed hosts with their fastest measured endpoint")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long, global = true)]
    dns_port: Option<u16>,

    /// Control API port
    #[arg(short = 'w', long, global = true)]
    web_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long, global = true)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Command {
    /// Run the DNS server, the control API and (when enabled) the prober
    Serve,
    /// Run probe cycles only and push results to `control.push_url`
    Probe {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Ask the running server to reload its configuration file
    Reload,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        web_port: cli.web_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides.clone())?;
    bootstrap::init_logging(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, cli.config, cli_overrides).await,
        Command::Probe { once } => probe(config, once).await,
        Command::Reload => reload(&config).await,
    }
}

async fn serve(
    config: Config,
    config_path: Option<String>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<()> {
    info!("Starting Steer DNS v{}", env!("CARGO_PKG_VERSION"));

    let shared_config = Arc::new(RwLock::new(config.clone()));
    let shutdown = CancellationToken::new();

    let dns_services = di::DnsServices::new(&config);
    let probe_services = di::ProbeServices::new(
        &config,
        shared_config.clone(),
        dns_services.resolver.clone(),
        Some(dns_services.synthetic.clone() as Arc<dyn EndpointPublisher>),
        di::Deployment::Server,
    )?;

    match probe_services.publish.warm_up().await {
        Ok(0) => info!("No stored probe result to warm up from"),
        Ok(hosts) => info!(hosts, "Synthetic records restored from stored result"),
        Err(e) => warn!(error = %e, "Stored probe result unusable, waiting for first cycle"),
    }

    let dns_addr = format!("{}:{}", config.server.bind_address, config.server.dns_port);
    let dns_listeners = server::bind_dns(&dns_addr)?;

    let web_listener = if config.server.control_enabled {
        let web_addr: SocketAddr =
            format!("{}:{}", config.server.bind_address, config.server.web_port).parse()?;
        Some(server::bind_web(web_addr).await?)
    } else {
        None
    };

    let mut runner = JobRunner::new().with_shutdown_token(shutdown.clone());
    if config.probe.enabled {
        runner = runner.with_probe_cycle(ProbeCycleJob::new(
            probe_services.cycle.clone(),
            config.probe.refresh_interval.as_duration(),
        ));
    } else {
        info!("In-process probing disabled, expecting results via the control API");
    }
    runner.start().await;

    let dns_task = tokio::spawn(server::serve_dns(
        dns_listeners,
        dns_services.handler(),
        shutdown.clone(),
    ));

    if let Some(listener) = web_listener {
        let app_state = AppState {
            reload_config: Arc::new(
                ReloadConfigUseCase::new(shared_config.clone())
                    .with_path(config_path)
                    .with_overrides(cli_overrides),
            ),
            publish_result: probe_services.publish.clone(),
            result_store: Some(probe_services.store.clone() as Arc<dyn ResultStorePort>),
            probe_cycle: Some(probe_services.cycle.clone()),
            auth: ControlAuth::from_config(&config.control),
        };
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = server::serve_web(listener, app_state, token).await {
                error!(error = %e, "Control API error");
            }
        });
    }

    shutdown_signal().await;
    shutdown.cancel();
    let _ = dns_task.await;

    info!("Server shutdown complete");
    Ok(())
}

async fn probe(config: Config, once: bool) -> anyhow::Result<()> {
    info!("Starting Steer DNS tester v{}", env!("CARGO_PKG_VERSION"));

    let shared_config = Arc::new(RwLock::new(config.clone()));
    let resolver = di::dns::build_resolver(&config);
    let probe_services = di::ProbeServices::new(
        &config,
        shared_config,
        resolver,
        None,
        di::Deployment::Tester,
    )?;

    if once {
        let report = probe_services.cycle.execute().await?;
        info!(
            hosts = report.hosts_probed,
            selected = report.hosts_selected,
            "Single probe cycle finished"
        );
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    JobRunner::new()
        .with_probe_cycle(ProbeCycleJob::new(
            probe_services.cycle.clone(),
            config.probe.refresh_interval.as_duration(),
        ))
        .with_shutdown_token(shutdown.clone())
        .start()
        .await;

    shutdown_signal().await;
    shutdown.cancel();
    info!("Tester shutdown complete");
    Ok(())
}

async fn reload(config: &Config) -> anyhow::Result<()> {
    let control = &config.control;
    let client = ControlClient::new(
        control.server_url.clone(),
        control.header_name.clone(),
        control.secret.clone(),
        Duration::from_secs(10),
    )?;
    client.reload().await?;
    info!(server = %control.server_url, "Configuration reload accepted");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
