//! docusense-server - support ticket ingest and classification service
//!
//! Startup sequence:
//! 1. Parse CLI, resolve and load the bootstrap TOML config
//! 2. Initialize tracing at the configured level (`RUST_LOG` overrides)
//! 3. Open or create the SQLite database
//! 4. Fit the demo classifier
//! 5. Serve HTTP until Ctrl+C / SIGTERM

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docusense_common::config::{load_toml_config, resolve_config_path, resolve_database_path};
use docusense_server::classifier::DemoClassifier;
use docusense_server::ingest::IngestSettings;
use docusense_server::{build_router, AppState};

/// Command-line arguments for docusense-server
#[derive(Parser, Debug)]
#[command(name = "docusense-server")]
#[command(about = "Support ticket ingest and classification service")]
#[command(version)]
struct Args {
    /// Bootstrap TOML config file
    #[arg(short, long, env = "DOCUSENSE_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind (overrides config file)
    #[arg(long, env = "DOCUSENSE_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "DOCUSENSE_PORT")]
    port: Option<u16>,

    /// SQLite database path (overrides config file)
    #[arg(short, long, env = "DOCUSENSE_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loads before tracing so the level can come from the file
    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_toml_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "docusense_server={level},docusense_common={level},tower_http={level}",
                    level = config.logging.level.to_lowercase()
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting DocuSense server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (compiled defaults)"),
    }

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database: {}", db_path.display());
    let pool = docusense_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let classifier = DemoClassifier::train().context("Failed to train demo classifier")?;

    let ingest = IngestSettings::from(&config.ingest);
    info!(
        atomicity = ?ingest.atomicity,
        ticket_id_preview = ingest.ticket_id_preview,
        max_upload_bytes = config.max_upload_bytes,
        "Ingest settings"
    );

    let state = AppState::new(pool, Arc::new(classifier), ingest);
    let app = build_router(state, config.max_upload_bytes);

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let ip = host
        .parse()
        .with_context(|| format!("Invalid host address: {}", host))?;
    let addr = SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(addr)
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

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
