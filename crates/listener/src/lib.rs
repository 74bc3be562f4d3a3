//! PolicyLens HTTP surface.
//!
//! Exposes `POST /analyze` and `GET /health` over axum and wires the
//! per-request concerns around the [`analyzer::PolicyAnalyzer`]:
//!
//! | Layer (outermost first) | Applies to | Module |
//! |-------------------------|------------|--------|
//! | HTTP trace | all routes | `tower-http` |
//! | Correlation id span | all routes | [`middleware::correlation`] |
//! | CORS headers and preflight | all routes | [`middleware::cors`] |
//! | Demo password gate | `/analyze` | [`middleware::demo_password`] |
//! | Rate limit admission | `/analyze` | [`middleware::rate_limit`] |
//! | Body decode and validation | `/analyze` | [`validation`] |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Everything HTTP-specific lives here. Domain rules come
//! from [`pipeline`]; this crate only maps them to status codes and headers.

pub mod cache;
pub mod client_key;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use cache::MemoryCounterCache;
pub use config::{ContactInfo, ServerConfig};
pub use error::{ApiError, Violation};
pub use state::AppState;

/// Builds the application router with every layer attached.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::demo_password,
        ))
        .route("/health", get(handlers::health))
        .layer(axum::middleware::from_fn(middleware::cors))
        .layer(axum::middleware::from_fn(middleware::correlation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the application on `listener` until Ctrl+C or SIGTERM.
///
/// Peer addresses are made available to the rate limiter through
/// [`axum::extract::ConnectInfo`].
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "PolicyLens listening");
    }
    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down gracefully"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down gracefully"),
    }
}
