//! Command implementations for the gymtrack CLI

pub mod admin;
pub mod config;
pub mod serve;

pub use admin::run_admin;
pub use config::run_config;
pub use serve::run_serve;
