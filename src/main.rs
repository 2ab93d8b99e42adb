use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod artifacts;
mod assets;
mod counter;
mod error;
mod models;
mod storage;

use counter::DownloadCounter;
use models::StorageConfig;

#[derive(Clone)]
pub struct AppState {
    config: Arc<StorageConfig>,
    counter: Arc<DownloadCounter>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "icoder_files=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StorageConfig::from_env();

    storage::ensure_storage_dir(&config.files_dir)
        .await
        .with_context(|| format!("creating storage directory {}", config.files_dir.display()))?;
    info!("Serving files from {}", config.files_dir.display());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let counter = Arc::new(DownloadCounter::new());
    let state = AppState {
        config: Arc::new(config),
        counter: Arc::clone(&counter),
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("iCoder server is running at http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Counts are not persisted
    info!(downloads = ?counter.snapshot(), "Server stopped");
    Ok(())
}

/// Static assets, the listing API and downloads; anything else is a 404
fn app(state: AppState) -> Router {
    Router::new()
        .merge(assets::routes())
        .merge(artifacts::routes())
        .fallback(error::not_found)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received");
}
