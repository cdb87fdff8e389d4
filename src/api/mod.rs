//! HTTP server module
//!
//! One method-agnostic extraction endpoint plus a liveness probe. Each
//! connection is handled as an independent task; requests share nothing but
//! the read-only [`AppState`].

use crate::error::{Error, Result};
use axum::Router;
use axum::routing::{any, get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod routes;
pub mod state;

pub use state::AppState;

/// Create the router with all route definitions
///
/// # Routes
///
/// - `ANY /` - extraction endpoint (`url` and `path` query parameters)
/// - `GET /health` - liveness probe
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(routes::extract_entry))
        .route("/health", get(routes::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server on the configured bind address.
///
/// Binds a TCP listener, logs the address, and serves until a termination
/// signal arrives; in-flight requests are drained before returning.
pub async fn start_server(state: AppState) -> Result<()> {
    let bind_address = state.config.server.bind_address;
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;
    let local_address = listener.local_addr().map_err(Error::Io)?;
    tracing::info!(address = %local_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::wait_for_signal())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    tracing::info!("server stopped");
    Ok(())
}
