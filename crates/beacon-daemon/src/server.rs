//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use beacon_registry::ServiceRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Beacon daemon server
pub struct Server {
    config: DaemonConfig,
    registry: Arc<ServiceRegistry>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> Self {
        let timeout = chrono::Duration::seconds(config.registry.heartbeat_timeout_secs as i64);
        let registry = Arc::new(ServiceRegistry::new(timeout));

        Self { config, registry }
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.registry.clone());
        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("beacond listening on {}", addr);
        tracing::info!(
            timeout_secs = self.config.registry.heartbeat_timeout_secs,
            "heartbeat timeout"
        );

        // Handlers read the peer address for instance registration, so
        // the service must be built with connect info.
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("beacond shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
