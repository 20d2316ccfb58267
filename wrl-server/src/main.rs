//! wrl-server (Watch Read Listen) - Main entry point
//!
//! Serves the search and saved-list pages plus the JSON API on one port.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wrl_common::config::{resolve_config_path, TomlConfig};
use wrl_common::store::open_store;
use wrl_server::{build_aggregator, build_router, AppState};

/// Command-line arguments for wrl-server
#[derive(Parser, Debug)]
#[command(name = "wrl-server")]
#[command(about = "Search movies, books and albums at once and keep a list of favourites")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "WRL_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Saved entries file (overrides config file and WRL_ENTRIES_PATH)
    #[arg(short, long)]
    entries: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can apply
    let config_path = resolve_config_path(args.config.as_deref());
    let loaded = TomlConfig::load(&config_path);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    let default_filter = format!("wrl_server={level},wrl_common={level},tower_http={level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Watch Read Listen (wrl-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = loaded.context("Failed to load configuration")?;
    if config_path.exists() {
        info!("Configuration: {}", config_path.display());
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            config_path.display()
        );
    }

    config.apply_env_overrides();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(entries) = args.entries {
        config.storage.path = entries;
    }

    info!(
        "Saved entries: {} ({:?} backend)",
        config.storage.path.display(),
        config.storage.backend
    );
    let store = open_store(&config.storage)
        .await
        .context("Failed to open entry store")?;

    let aggregator = build_aggregator(&config).context("Failed to build catalog clients")?;
    if let Some(timeout) = config.search_timeout() {
        info!("Search deadline: {}s", timeout.as_secs());
    }

    let app = build_router(AppState::new(aggregator, store));

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("wrl-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("wrl-server stopped");
    Ok(())
}

/// Resolves on the first Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Interrupt received, draining connections");
        },
        _ = terminate => {
            info!("SIGTERM received, draining connections");
        },
    }
}
