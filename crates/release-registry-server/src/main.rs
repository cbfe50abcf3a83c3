//! Release Registry Server
//!
//! Main entry point for the Release Registry. `serve` runs the HTTP API with
//! graceful shutdown; `snapshot` renders the registry into a static tree.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use release_registry_api::build_api_server_with_config;
use release_registry_service::ServiceRegistry;
use release_registry_store::FileRegistryStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use config::{resolve_cache_enabled, ServerConfig, ENABLE_CACHE_VAR};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development", global = true)]
    environment: String,

    /// Registry root directory
    #[arg(short, long, env = "REGISTRY_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Server host
    #[arg(long, env = "SERVER_HOST", global = true)]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "PORT", global = true)]
    port: Option<u16>,

    /// Log level
    #[arg(long, env = "RUST_LOG", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the registry over HTTP (default)
    Serve,

    /// Write every endpoint as static JSON files
    Snapshot {
        /// Output directory; its contents are replaced
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = ServerConfig::load_or_default(&args.config_dir, &args.environment);

    // Override with command-line arguments
    if let Some(root) = args.root {
        config.registry.root = root;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    telemetry::init(&config.logging);

    info!("Environment: {}", args.environment);
    info!("Registry root: {}", config.registry.root.display());

    let store = FileRegistryStore::open(config.registry.root.clone())
        .await
        .context("Failed to open registry root")?;
    let services = ServiceRegistry::new(Arc::new(store));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, &args.environment, services).await,
        Command::Snapshot { output } => snapshot(services, output).await,
    }
}

/// Run the HTTP server until shutdown
async fn serve(config: ServerConfig, environment: &str, services: ServiceRegistry) -> Result<()> {
    info!("Starting Release Registry Server");

    let cache_flag = std::env::var(ENABLE_CACHE_VAR).ok();
    let cache_enabled = resolve_cache_enabled(cache_flag.as_deref(), config.cache.enabled, environment);
    info!("Response cache: {}", if cache_enabled { "on" } else { "off" });

    let app = build_api_server_with_config(services, config.middleware_config(cache_enabled));

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("Invalid HTTP bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind HTTP server")?;

    info!("HTTP Server listening on http://{}", addr);

    if config.server.graceful_shutdown {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP Server error")?;
    } else {
        axum::serve(listener, app.into_make_service())
            .await
            .context("HTTP Server error")?;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Render the registry into `output`
async fn snapshot(services: ServiceRegistry, output: PathBuf) -> Result<()> {
    info!("Writing snapshot to {}", output.display());

    let summary = services
        .snapshot()
        .build(&output)
        .await
        .context("Failed to write snapshot")?;

    info!(
        "Snapshot complete: {} packages, {} SDKs, {} apps, {} Lambda layers, {} marketing slugs",
        summary.packages,
        summary.sdks,
        summary.apps,
        summary.lambda_layers,
        summary.marketing_slugs
    );
    Ok(())
}

/// Graceful shutdown signal handler
///
/// Waits for SIGTERM or SIGINT (Ctrl+C).
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
