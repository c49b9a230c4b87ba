use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tripscan::TransitModel;
use tripscan_server::{AppState, Config, create_router};

/// Trip-based transit journey planning server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
    /// GTFS feed directory, may be repeated; replaces the configured feeds
    #[arg(long = "gtfs-dir")]
    gtfs_dirs: Vec<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if !self.gtfs_dirs.is_empty() {
            config.network.gtfs_dirs = self.gtfs_dirs;
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Loading transit network from {} feed(s)",
        config.network.gtfs_dirs.len()
    );
    let started = Instant::now();
    let network_config = config.network.clone();
    let model = tokio::task::spawn_blocking(move || TransitModel::load(&network_config)).await??;
    info!("{model} loaded in {:?}", started.elapsed());

    let app = create_router(Arc::new(AppState::new(model, &config)));
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
