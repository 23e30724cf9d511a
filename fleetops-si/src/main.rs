//! fleetops-si - Schedule Import service
//!
//! Accepts CSV uploads of shifts and driver shift assignments, creates the
//! rows in the fleet database and streams per-row progress over SSE.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fleetops_common::config::TomlConfig;
use fleetops_common::events::EventBus;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetops_si::services::RestStore;
use fleetops_si::{AppState, ImportOptions};

/// Command-line arguments for fleetops-si
#[derive(Parser, Debug)]
#[command(name = "fleetops-si")]
#[command(about = "Schedule Import service for FleetOps")]
#[command(version)]
struct Args {
    /// Config file (default: FLEETOPS_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FLEETOPS_PORT")]
    port: Option<u16>,

    /// Job history database file
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetops_si=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting fleetops-si (Schedule Import) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }

    let access_token = config.require_access_token()?;
    let store = RestStore::from_config(&config.store, access_token)
        .context("Failed to create remote store client")?;
    info!("Remote store: {}", store.rest_url());

    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = fleetops_si::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);

    let options = ImportOptions::from(&config.import);
    info!(
        locale = %options.locale,
        max_in_flight = options.max_in_flight,
        upsert = options.upsert,
        "Import options"
    );

    let state = AppState::new(db_pool, event_bus, Arc::new(store), options);
    let app = fleetops_si::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
