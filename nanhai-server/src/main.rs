//! Nanhai dive server (nanhai-server) - Main entry point
//!
//! Loads configuration, opens the document store, starts the game engine and
//! serves the HTTP/SSE API until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nanhai_common::config::{CliOverrides, ConfigSource, ServerSettings};
use nanhai_common::db::{init_database, DocumentStore};
use nanhai_common::events::EventBus;
use nanhai_common::ArtifactCatalog;
use nanhai_server::{build_router, AppState, ConnectionLimiter, GameEngine};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Broadcast buffer per subscriber before old events are dropped
const EVENT_BUS_CAPACITY: usize = 100;

/// Command-line arguments for nanhai-server
#[derive(Parser, Debug)]
#[command(name = "nanhai-server")]
#[command(about = "Multiplayer artifact dive game server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "NANHAI_PORT")]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long, env = "NANHAI_HOST")]
    host: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "NANHAI_DATABASE")]
    database: Option<PathBuf>,

    /// Maximum simultaneous live (SSE) connections
    #[arg(long, env = "NANHAI_MAX_CONNECTIONS")]
    max_connections: Option<usize>,

    /// TOML file replacing the built-in artifact catalog
    #[arg(long, env = "NANHAI_CATALOG")]
    catalog: Option<PathBuf>,

    /// Directory of client assets served for unmatched paths
    #[arg(long, env = "NANHAI_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "NANHAI_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read before the subscriber exists; the outcome is logged once it does
    let config_source = ConfigSource::locate(args.config.as_deref());
    let toml = config_source.load().context("Failed to load config file")?;
    let settings = ServerSettings::resolve(
        CliOverrides {
            host: args.host,
            port: args.port,
            database_path: args.database,
            max_connections: args.max_connections,
            catalog_path: args.catalog,
            static_dir: args.static_dir,
        },
        toml,
    );

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "nanhai_server={level},nanhai_common={level},tower_http={level}",
                    level = settings.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config_source.log();
    info!("Starting Nanhai dive server v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", settings.database_path.display());

    let catalog = match &settings.catalog_path {
        Some(path) => {
            info!("Loading artifact catalog from {}", path.display());
            ArtifactCatalog::load(path).context("Failed to load artifact catalog")?
        }
        None => ArtifactCatalog::default(),
    };

    let pool = init_database(&settings.database_path)
        .await
        .context("Failed to open database")?;

    let events = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
    let engine = GameEngine::start(DocumentStore::new(pool), catalog, events)
        .await
        .context("Failed to initialize game state")?;

    let limiter = ConnectionLimiter::new(settings.max_connections);
    info!("Live connection cap: {}", settings.max_connections);

    if let Some(dir) = &settings.static_dir {
        info!("Serving static assets from {}", dir.display());
    }

    let app = build_router(
        AppState::new(Arc::new(engine), limiter),
        settings.static_dir.clone(),
    );

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server running on http://{}", addr);

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
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
