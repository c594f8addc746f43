//! pmo-dashboard - PMO reporting service entry point
//!
//! Resolves the root folder, selects the model store, optionally ingests the
//! input files already on disk, then serves the dashboard API.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pmo_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use pmo_dashboard::comments::CommentStore;
use pmo_dashboard::ingest::IngestPaths;
use pmo_dashboard::store::{select_store, StorageChoice};
use pmo_dashboard::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pmo-dashboard
#[derive(Parser, Debug)]
#[command(name = "pmo-dashboard")]
#[command(about = "PMO capacity, indicator and planning dashboard service")]
#[command(version)]
struct Args {
    /// Root folder holding input files and persisted data
    #[arg(short, long, env = "PMO_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "PMO_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Model storage backend
    #[arg(long, value_enum, default_value = "auto")]
    storage: StorageChoice,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ingest the input files already on disk before serving
    #[arg(long)]
    reprocess_on_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read config before tracing so its log level can apply; outcome is logged below
    let (config, config_outcome) = TomlConfig::resolve(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "pmo_dashboard={0},pmo_common={0},tower_http=info",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting PMO Dashboard (pmo-dashboard) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config_outcome.log();

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_config(config.clone())
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let store = match select_store(
        args.storage,
        &initializer.database_path(),
        &initializer.model_file_path(),
    )
    .await
    {
        Ok(store) => {
            info!("✓ Model storage: {}", store.name());
            store
        }
        Err(e) => {
            error!("Failed to open model storage: {}", e);
            return Err(e.into());
        }
    };

    let inputs = IngestPaths {
        tasks: initializer.input_path(&config.tasks_file),
        roster: initializer.input_path(&config.roster_file),
    };
    info!("Timesheet export: {}", inputs.tasks.display());
    info!("Analyst roster: {}", inputs.roster.display());

    let state = AppState::new(
        store,
        CommentStore::new(initializer.comments_file_path()),
        inputs,
        config.max_upload_bytes,
    );

    if args.reprocess_on_start {
        // A failed startup ingestion leaves the previous model in place
        match state.reprocess().await {
            Ok(summary) => info!(
                projects = summary.metadata.total_projects,
                tasks = summary.metadata.total_tasks,
                "Startup ingestion complete"
            ),
            Err(e) => error!("Startup ingestion failed: {}", e),
        }
    }

    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, args.port.unwrap_or(config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("pmo-dashboard listening on http://{}", addr);
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
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
