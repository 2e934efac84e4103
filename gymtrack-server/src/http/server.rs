//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Periodic purge of expired admin sessions
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::http::HeaderValue;
use axum::Router;
use chrono::Duration;
use chrono_tz::Tz;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gymtrack_core::config::ServerSection;
use gymtrack_core::{DocumentStore, GymConfig};

use super::routes;
use super::session::SessionStore;

/// How often expired sessions are swept
const SESSION_PURGE_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// Listener settings.
///
/// CORS follows `[server] cors_permissive` in the `GymConfig` held by
/// `AppState`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
        }
    }
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        Self {
            bind_addr: section.bind,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<GymConfig>,
    /// Timezone that decides "today" and month boundaries
    pub tz: Tz,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: GymConfig) -> Result<Self, ServerError> {
        let tz = config
            .timezone()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        let ttl = Duration::try_minutes(config.sessions.ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "invalid session ttl: {} minutes",
                    config.sessions.ttl_minutes
                ))
            })?;

        Ok(Self {
            sessions: SessionStore::new(Arc::clone(&store), ttl),
            store,
            config: Arc::new(config),
            tz,
        })
    }
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:3030"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://127.0.0.1:3030"),
        ])
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.server.cors_permissive);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::attendance::router())
        .merge(routes::catalog::router())
        .merge(routes::auth::router())
        .merge(routes::history::router())
        .merge(routes::equipment::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(state);
    let app = build_router(Arc::clone(&state));

    let purge = {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SESSION_PURGE_INTERVAL);
            loop {
                tick.tick().await;
                let purged = state.sessions.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "expired admin sessions removed");
                }
            }
        })
    };

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        timezone = %state.tz,
        "Server listening"
    );

    // Run with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    purge.abort();
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
