//! ksr-ui - Kiosk Store Reviews shell
//!
//! Serves the review kiosk over a local HTTP API. Ratings are appended to
//! the review table as soon as a face is tapped; an optional follow-up
//! comment amends that record.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ksr_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use ksr_common::{CsvReviewStore, MemoryReviewStore, ReviewStore};
use ksr_ui::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for ksr-ui
#[derive(Parser, Debug)]
#[command(name = "ksr-ui")]
#[command(about = "Customer review kiosk for Kiosk Store Reviews")]
#[command(version)]
struct Args {
    /// Folder holding the review table
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (defaults to the platform config location)
    #[arg(short, long, env = "KSR_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "KSR_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(long, env = "KSR_BIND")]
    bind: Option<String>,

    /// Keep reviews in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists because it carries the log level
    let config_path = TomlConfig::locate(args.config.as_deref())?;
    let config = match &config_path {
        Some(path) => TomlConfig::load_from(path)?,
        None => TomlConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting ksr-ui v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }

    let store: Arc<dyn ReviewStore> = if args.ephemeral {
        warn!("Ephemeral mode: reviews are kept in memory and lost on exit");
        Arc::new(MemoryReviewStore::new())
    } else {
        let root_folder = RootFolderResolver::new(args.root_folder.clone(), &config).resolve();
        let initializer = RootFolderInitializer::new(root_folder);
        initializer
            .ensure_directory_exists()
            .context("Failed to prepare root folder")?;

        let reviews_path = initializer.reviews_path(&config.reviews_file);
        info!("Review table: {}", reviews_path.display());

        let store = CsvReviewStore::new(reviews_path);
        let existing = store
            .len()
            .context("Failed to read existing review table")?;
        info!("✓ Review table readable ({} review(s) on record)", existing);
        Arc::new(store)
    };

    info!("Comment amendment target: {:?}", config.amend_target);
    let state = AppState::new(store, config.amend_target);
    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind);
    let port = args.port.unwrap_or(config.port);
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", bind))?;
    let addr = SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("ksr-ui listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix (how a kiosk service is stopped)
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM unavailable, stopping on Ctrl+C only: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        Ok(()) = signal::ctrl_c() => {}
        _ = sigterm => {}
    }
    info!("Shutdown signal received");
}
