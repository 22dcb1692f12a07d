//! Arena tournament server.
//!
//! Serves the REST API, the wallet WebSocket feed and uploaded files over one
//! listener, backed by either the in-memory or the PostgreSQL document store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use arena::{
    Arena,
    storage::{LocalObjectStore, ObjectStore},
    store::{DocumentStore, MemoryStore, PgDocumentStore},
};
use arena_server::{
    api,
    config::{ServerConfig, StoreBackend},
    logging, metrics,
};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the arena tournament server

USAGE:
  arena_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --backend    NAME        Document store: memory | postgres  [default: env STORE_BACKEND or memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET               JWT signing secret (required, 32+ chars)
  PASSWORD_PEPPER          Password hashing pepper (required, 16+ chars)
  FEDERATION_SECRET        Identity broker signing secret (32+ chars, federated sign-in off when unset)
  UPLOAD_DIR               Directory for uploaded images  [default: uploads]
  PUBLIC_BASE_URL          Base URL clients reach this server at
  METRICS_BIND             Prometheus exporter address (metrics off when unset)
  PAYMENT_PROCESSING_DELAY_MS, MIN_DEPOSIT, MAX_DEPOSIT, MIN_WITHDRAWAL
  DATABASE_URL, DB_MAX_CONNECTIONS, DB_CONNECTION_TIMEOUT_SECS (postgres backend)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    backend: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        backend: pargs.opt_value_from_str("--backend")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.backend)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store; state is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            info!("Connecting to database");
            let store = PgDocumentStore::connect(&config.database)
                .await
                .context("Failed to connect to database")?;
            store.migrate().await.context("Failed to migrate database")?;
            info!("Database connected successfully");
            Arc::new(store)
        }
    };

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("Failed to create {}", config.uploads.dir.display()))?;
    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        config.uploads.dir.clone(),
        config.files_base_url(),
    ));

    let mut arena = Arena::new(
        store.clone(),
        objects.clone(),
        config.wallet.clone(),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    );
    match &config.security.federation_secret {
        Some(secret) => arena = arena.with_federation_secret(secret.clone()),
        None => info!("FEDERATION_SECRET not set, federated sign-in disabled"),
    }
    let app = api::create_router(api::AppState::new(arena, store, objects));

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
