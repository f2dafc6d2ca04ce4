//! Gatekeeper server entry point.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatekeeper::config::loader::load_config;
use gatekeeper::{GatekeeperConfig, GatekeeperServer, Shutdown};

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Request gatekeeper: rate limiting, bot detection, validation gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatekeeperConfig::default(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "gatekeeper={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limiting = config.rate_limit.enabled,
        bot_detection = config.bot_detection.enabled,
        metrics = config.metrics.enabled,
        "Configuration loaded"
    );

    if config.metrics.exporter_enabled {
        match config.metrics.exporter_address.parse() {
            Ok(addr) => gatekeeper::observability::metrics::init_exporter(addr),
            Err(e) => tracing::error!(
                exporter_address = %config.metrics.exporter_address,
                error = %e,
                "Failed to parse exporter address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    let server = GatekeeperServer::new(config);
    server.run(listener, admin_listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
