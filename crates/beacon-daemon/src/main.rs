//! Beacon Daemon - dynamic service directory
//!
//! Service instances announce themselves with periodic PUT /register
//! calls; consumers locate a live instance with GET /find; instances
//! whose heartbeats stop are reclassified inactive on the next access.

use beacon_daemon::{DaemonConfig, DaemonError, Server};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Beacon Daemon CLI
#[derive(Parser)]
#[command(name = "beacond")]
#[command(about = "Beacon Daemon - dynamic service directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BEACON_CONFIG")]
    config: Option<String>,

    /// Listen address (overrides configuration)
    #[arg(short, long, env = "BEACON_LISTEN_ADDR")]
    listen: Option<String>,

    /// Heartbeat timeout in seconds (overrides configuration)
    #[arg(long, env = "BEACON_HEARTBEAT_TIMEOUT")]
    heartbeat_timeout: Option<u64>,

    /// Log level
    #[arg(long, env = "BEACON_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "BEACON_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(timeout) = cli.heartbeat_timeout {
        config.registry.heartbeat_timeout_secs = timeout;
    }

    // Create and run server
    let server = Server::new(config);
    server.run().await
}
