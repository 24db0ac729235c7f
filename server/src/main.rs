mod app;
mod config;
mod routes;
mod services;
mod state;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let state = AppState::from_env();
    if !state.data_dir.is_dir() {
        tracing::warn!(dir = %state.data_dir.display(), "data directory does not exist; /data requests will 404");
    }
    if !state.client_dist_dir.is_dir() {
        tracing::warn!(dir = %state.client_dist_dir.display(), "client bundle directory does not exist");
    }

    let loader = tokio::spawn(services::dataset_loader::run(state.clone()));

    let app = app::build_app(state);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("GridAtlas server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    loader.abort();
    tracing::info!("Server shut down gracefully");
}

/// Resolves on Ctrl+C or SIGTERM. A signal that cannot be listened for
/// never fires.
async fn shutdown_signal() {
    let source = tokio::select! {
        () = interrupt() => "interrupt",
        () = terminate() => "terminate",
    };
    tracing::info!(source, "shutdown signal received");
}

async fn interrupt() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
