use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lumpy_core::{ExtractorConfig, Pipeline};
use lumpy_server::{AppState, Config, MemoryStore, PostgresStore, RecordStore};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "lumpy_server=info,lumpy_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();

    let config = Config::parse();

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => Arc::new(PostgresStore::connect(url).await.context("Failed to open PostgreSQL store")?),
        None => {
            tracing::warn!("DATABASE_URL is not set; saved articles live in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let pipeline =
        Pipeline::new(&config.fetch_config(), ExtractorConfig::default()).context("Failed to build HTTP client")?;
    let app = lumpy_server::app(AppState::new(pipeline, Arc::clone(&store)), &config.serve_options());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "listening");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    store.close().await;
    served.context("Server error")?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
