use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use postboard_api::config::AppConfig;
use postboard_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use postboard_api::storage::DiskFileDisposer;
use postboard_api::AppState;

#[derive(Parser)]
#[command(name = "postboard-api", version, about = "Multi-user post board API server")]
struct Args {
    #[arg(long, help = "Port to listen on (overrides POSTBOARD_API_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides SERVER_BIND)")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("postboard_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    info!("Starting Postboard API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            DatabaseManager::ensure_schema(&pool)
                .await
                .context("failed to prepare database schema")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    let files = Arc::new(DiskFileDisposer::new(&config.storage.image_root));

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = AppState::new(config, store, files)?;
    let app = postboard_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Postboard API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
