//! Startup orchestration.
//!
//! Any startup error is fatal. Subsystems initialize in order and the
//! listener binds last, so traffic only arrives once routing is ready.

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError};
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("Failed to build routes: {0}")]
    Routes(#[from] GatewayError),

    #[error("Listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration and serve until SIGINT or SIGTERM.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let config = load_config(config_path)?;
    logging::init_logging(&config)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.environment.as_str(),
        "bff-gateway starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.upstream.base_url,
        routes = config.routes.len() + 1,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
