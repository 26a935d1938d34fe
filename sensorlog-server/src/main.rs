//! SensorLog Server - HTTP API over the sensor log

mod api;

use clap::Parser;
use sensorlog_core::{Store, StoreConfig, SyncPolicy};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "sensorlog", version, about = "SensorLog HTTP server")]
pub struct CliArgs {
    /// HTTP listen address
    #[arg(long, env = "SENSORLOG_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Sensor log file
    #[arg(long, env = "SENSORLOG_DATA_FILE", default_value = sensorlog_core::config::DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Sync policy for inserts: none or immediate
    #[arg(long, default_value = "none")]
    pub sync: SyncPolicy,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Sensor log file
    pub data_file: PathBuf,
    /// Sync policy for inserts
    pub sync: SyncPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_file: PathBuf::from(sensorlog_core::config::DEFAULT_DATA_FILE),
            sync: SyncPolicy::default(),
        }
    }
}

impl From<&CliArgs> for ServerConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            http_addr: args.addr,
            data_file: args.data_file.clone(),
            sync: args.sync,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from(&CliArgs::parse());

    info!("Starting SensorLog server...");
    info!("Data file: {:?}", config.data_file);

    let store = Store::open_with_config(StoreConfig {
        path: config.data_file.clone(),
        schema: None,
        sync: config.sync,
    })?;
    let store = Arc::new(store);

    // Create router
    let app = api::create_router(store);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("SensorLog server listening on http://{}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SensorLog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
