//! HTTP server command
//!
//! Runs the gymtrack API over Postgres, or over an in-memory store with
//! `--memory` for demos and local trials.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gymtrack_core::{DocumentStore, GymConfig, MemoryStore};
use gymtrack_server::db::{connect, migrations, PgStore};
use gymtrack_server::{run_server, AppState, ServerConfig};

use super::admin::{create_admin, PASSWORD_ENV};

/// Administrator seeded into an in-memory store
const MEMORY_ADMIN_ENV: &str = "GYMTRACK_ADMIN_USERNAME";

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep all data in memory (lost on exit); no database needed
    #[arg(long)]
    pub memory: bool,
}

/// Config file values with command-line overrides applied.
fn effective_config(args: &ServeArgs, config_path: &Path) -> Result<GymConfig> {
    let mut config = GymConfig::load_from(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }
    Ok(config)
}

async fn memory_store() -> Result<Arc<dyn DocumentStore>> {
    tracing::warn!("in-memory store: all data is lost when the server stops");
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        let username =
            std::env::var(MEMORY_ADMIN_ENV).unwrap_or_else(|_| "admin".to_string());
        create_admin(store.as_ref(), &username, password).await?;
    } else {
        tracing::warn!("{} not set: no administrator can log in", PASSWORD_ENV);
    }
    Ok(store)
}

async fn postgres_store(config: &GymConfig) -> Result<Arc<dyn DocumentStore>> {
    let pool = connect(&config.database)
        .await
        .context("Failed to create database pool")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(Arc::new(PgStore::new(pool)))
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: &Path) -> Result<()> {
    let config = effective_config(&args, config_path)?;
    tracing::info!(
        config = %config_path.display(),
        bind = %config.server.bind,
        memory = args.memory,
        "starting gymtrack server"
    );

    let store = if args.memory {
        memory_store().await?
    } else {
        postgres_store(&config).await?
    };

    let server_config = ServerConfig::from(&config.server);
    let state = AppState::new(store, config).context("Invalid server configuration")?;

    // Blocks until shutdown
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServeArgs {
        ServeArgs {
            bind: None,
            cors_permissive: false,
            database_url: None,
            memory: false,
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:4000\"\n").unwrap();

        let config = effective_config(&args(), &path).unwrap();
        assert_eq!(config.server.bind.port(), 4000);
        assert!(!config.server.cors_permissive);

        let overridden = ServeArgs {
            bind: Some("0.0.0.0:9000".parse().unwrap()),
            cors_permissive: true,
            ..args()
        };
        let config = effective_config(&overridden, &path).unwrap();
        assert_eq!(config.server.bind.port(), 9000);
        assert!(config.server.cors_permissive);
    }
}
