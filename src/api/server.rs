use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::{
    services::{health, record_timestamp},
    state::AppState,
};
use crate::config::Config;
use crate::observability::Metrics;
use crate::window::{TimestampService, TimestampStore};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Routes for the record endpoint and the health check
pub fn router(state: AppState) -> Router {
    let route = state.config.server.route.clone();

    Router::new()
        .route(&route, get(record_timestamp))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    info!(
        path = %config.window.file.display(),
        threshold = %config.window.threshold,
        "Opening timestamp store"
    );
    let store = Arc::new(TimestampStore::open_file(
        &config.window.file,
        config.window.on_malformed,
    ));
    let metrics = Arc::new(Metrics::new());
    let service = TimestampService::new(store.clone(), config.window.threshold_secs())
        .with_metrics(metrics.clone());

    // Load, prune and sync before accepting traffic
    let init_timeout = config.server.init_timeout;
    tokio::time::timeout(init_timeout.as_duration(), service.initialize())
        .await
        .map_err(|_| format!("Initialization timed out after {}", init_timeout))?
        .map_err(|e| format!("Failed to initialize service: {}", e))?;

    let address = config.server.bind_addr;
    let route = config.server.route.clone();
    let app = router(AppState::new(config, service));

    let listener = TcpListener::bind(address).await?;
    info!(%address, %route, "windowcount listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = store.close().await {
        error!(error = %e, "Error closing store");
    }
    info!(metrics = ?metrics.snapshot(), "Server exited");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
