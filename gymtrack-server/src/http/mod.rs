//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Bearer-token admin sessions
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod session;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use session::{AdminSession, SessionStore};
