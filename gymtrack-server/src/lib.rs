//! gymtrack-server: HTTP service for the campus gym
//!
//! Member registration and daily check-in are public; attendance history
//! and the equipment inspection log sit behind admin sessions and are paged
//! through per-session collection caches.

pub mod db;
pub mod export;
pub mod http;
pub mod models;

pub use db::PgStore;
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
