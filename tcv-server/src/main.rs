//! tcv-server - transcription comparison and voting service
//!
//! Startup: resolve the root folder, load `tcv.toml`, open the database,
//! seed configured models, then serve the API and the stored audio.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tcv_common::config::{resolve_root_folder, RootFolder, ServerConfig, ROOT_FOLDER_ENV};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tcv_server::storage::LocalBlobStore;
use tcv_server::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "tcv-server")]
#[command(about = "Crowdsourced transcription comparison service")]
#[command(version)]
struct Args {
    /// Root folder holding the database, settings and stored audio
    #[arg(short, long)]
    root_folder: Option<String>,

    /// Port to listen on (overrides tcv.toml)
    #[arg(short, long, env = "TCV_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides tcv.toml)
    #[arg(long, env = "TCV_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tcv_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting tcv-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root = RootFolder::new(resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV));
    root.ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", root.path().display());

    let mut config = ServerConfig::load(&root.settings_path()).context("Failed to load settings")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    let db_path = root.database_path();
    let pool = match tcv_common::db::init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    if !config.seed_models.is_empty() {
        let seeded = tcv_server::db::models::seed(&pool, &config.seed_models)
            .await
            .context("Failed to seed models")?;
        info!("Model seeding: {} new of {} configured", seeded, config.seed_models.len());
    }

    let storage_root = root.storage_path();
    let store = LocalBlobStore::new(&storage_root, config.public_base_url.clone());
    info!("Blob storage: {} (bucket {})", storage_root.display(), config.bucket);

    let bind_address = config.bind_address();
    let state = AppState::new(pool, Arc::new(store), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("tcv-server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
