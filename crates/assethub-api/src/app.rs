//! Application builder: wires router, middleware and state into an Axum app
//! and runs it until a shutdown signal arrives.

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();
    build_router(state)
        .layer(build_compression_layer())
        .layer(build_cors_layer(&server.cors))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState) -> AppResult<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let db_pool = state.db_pool.clone();

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;
    info!(%addr, "AssetHub listening");

    let server = axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    // Drain in-flight requests for at most `grace` once the signal fires.
    tokio::select! {
        result = server => result.map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Server error", e)
        })?,
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(grace).await;
        } => warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed"),
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    info!("AssetHub stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received");
}
