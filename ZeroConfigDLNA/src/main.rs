use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use zcdconfig::ServerConfig;
use zcdserver::MediaServer;

/// Serveur média DLNA zéro configuration.
#[derive(Parser)]
#[command(name = "ZeroConfigDLNA", version, about = "Zero configuration DLNA media server")]
struct Cli {
    /// Directory to serve media files from (default: current directory)
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Port to run the server on
    #[arg(short, long, default_value_t = 8200)]
    port: u16,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// IPv4 address to advertise (default: auto-detected)
    #[arg(long)]
    bind_ip: Option<IpAddr>,

    /// DLNA server name (default: ZeroConfigDLNA on <hostname>)
    #[arg(short = 'n', long)]
    server_name: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialiser le logging d'abord
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true),
    );
    tracing::subscriber::set_global_default(subscriber).expect("logging already initialized");

    let mut config = ServerConfig {
        port: cli.port,
        verbose: cli.verbose,
        bind_ip: cli.bind_ip,
        server_name: cli.server_name,
        ..Default::default()
    };
    if let Some(directory) = cli.directory {
        config.directory = directory;
    }

    if let Err(e) = config.validate() {
        error!("❌ {e}");
        std::process::exit(e.exit_code());
    }

    let mut server = match MediaServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("❌ Failed to initialize server: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = server.start().await {
        error!("❌ Failed to start server: {e}");
        std::process::exit(e.exit_code());
    }

    info!("Press Ctrl+C to stop the server");
    tokio::signal::ctrl_c().await.ok();

    // Premier signal : arrêt gracieux. Un second signal force la sortie.
    tokio::select! {
        _ = server.stop() => {}
        _ = tokio::signal::ctrl_c() => {
            warn!("Second signal received, exiting immediately");
        }
    }

    std::process::exit(0);
}
