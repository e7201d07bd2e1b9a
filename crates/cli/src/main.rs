use clap::{Parser, Subcommand};
use futures::future::join_all;
use ipmon_application::ports::{PeerConnection, ResolutionCachePort};
use ipmon_domain::config::NativeMode;
use ipmon_domain::{CliOverrides, ResolutionOptions};
use ipmon_infrastructure::native::NativeHost;
use ipmon_infrastructure::system::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

mod bootstrap;
mod daemon;
mod di;

#[derive(Parser)]
#[command(name = "ipmon")]
#[command(version)]
#[command(about = "ipmon - shows which IP addresses the domains you talk to resolve to")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Tab snapshot file
    #[arg(long, value_name = "FILE", global = true)]
    snapshot: Option<String>,

    /// DNS-over-HTTPS JSON endpoint
    #[arg(long, value_name = "URL", global = true)]
    doh_endpoint: Option<String>,

    /// Native resolver mode (in_process, process, disabled)
    #[arg(long, global = true)]
    native_mode: Option<NativeMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve domains and print what each one points at
    Resolve {
        #[arg(required = true)]
        domains: Vec<String>,

        /// Look up local names (.local, .lan, localhost, ...) too
        #[arg(long)]
        include_local: bool,
    },
    /// Serve native messaging frames on stdin/stdout
    NativeHost,
    /// Read ICE candidate lines from stdin and report public addresses
    DetectIp {
        /// Page URL recorded in the report
        #[arg(long)]
        url: Option<String>,
    },
    /// Answer JSON request lines from stdin with JSON response lines
    Daemon {
        /// Keep tab snapshots and settings in memory only
        #[arg(long)]
        ephemeral: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        snapshot_path: cli.snapshot.clone(),
        doh_endpoint: cli.doh_endpoint.clone(),
        native_mode: cli.native_mode,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    debug!(version = env!("CARGO_PKG_VERSION"), "ipmon starting");

    match cli.command {
        Command::Resolve {
            domains,
            include_local,
        } => run_resolve(&config, domains, include_local).await,
        Command::NativeHost => {
            let host = NativeHost::new(Duration::from_millis(config.native.timeout_ms));
            host.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
            Ok(())
        }
        Command::DetectIp { url } => run_detect_ip(&config, url).await,
        Command::Daemon { ephemeral } => run_daemon(&config, ephemeral).await,
    }
}

async fn run_resolve(
    config: &ipmon_domain::Config,
    domains: Vec<String>,
    include_local: bool,
) -> anyhow::Result<()> {
    let services = di::ResolverServices::new(config);
    let options = ResolutionOptions {
        exclude_local_domains: !include_local,
    };

    let results = join_all(
        domains
            .iter()
            .map(|domain| services.resolver.execute(domain, options)),
    )
    .await;

    let width = domains.iter().map(String::len).max().unwrap_or(0);
    for (domain, result) in domains.iter().zip(results) {
        println!(
            "{:<width$}  {:<7}  {}",
            domain,
            result.resolver().as_str(),
            result.display_state(),
        );
    }
    Ok(())
}

/// Candidate source fed from stdin. Closing it stops the reader task.
struct StdinPeer {
    reader: JoinHandle<()>,
}

impl StdinPeer {
    fn spawn(candidates: mpsc::Sender<String>) -> Self {
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if candidates.send(line.to_string()).await.is_err() {
                    break;
                }
            }
        });
        Self { reader }
    }
}

impl PeerConnection for StdinPeer {
    fn close(&mut self) {
        self.reader.abort();
    }
}

async fn run_detect_ip(config: &ipmon_domain::Config, url: Option<String>) -> anyhow::Result<()> {
    let detector = di::build_detector(config, Arc::new(SystemClock));

    let (tx, rx) = mpsc::channel(64);
    let peer = StdinPeer::spawn(tx);
    let report = detector.report(peer, rx, url).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_daemon(config: &ipmon_domain::Config, ephemeral: bool) -> anyhow::Result<()> {
    let resolver = di::ResolverServices::new(config);
    let app = di::AppServices::new(config, &resolver, ephemeral);

    match resolver.native.native_info().await {
        Ok(Some(native)) => info!(
            version = %native.version,
            platform = %native.platform,
            "Native resolver available"
        ),
        Ok(None) => info!("Native resolver disabled, using DNS-over-HTTPS only"),
        Err(e) => warn!(error = %e, "Native resolver did not answer"),
    }

    daemon::serve(app.router.clone(), tokio::io::stdin(), tokio::io::stdout()).await?;

    if let Err(e) = app.registry.flush().await {
        warn!(error = %e, "Final snapshot flush failed");
    }
    info!(cached_domains = resolver.cache.len(), "Daemon input closed");
    Ok(())
}
