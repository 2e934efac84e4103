//! gymtrack CLI - campus gym attendance and equipment tracking
//!
//! Subcommands:
//! - `serve`: run the HTTP API (Postgres, or an in-memory store for trials)
//! - `admin`: manage administrator accounts
//! - `config`: inspect and initialize the TOML configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gymtrack_core::GymConfig;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "gymtrack",
    author,
    version,
    about = "Attendance and equipment tracking for a campus gym",
    long_about = "Registers members, records daily check-ins per branch, and gives \
                  administrators paged attendance history and an equipment inspection log."
)]
struct Cli {
    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: $GYMTRACK_CONFIG or ~/.gymtrack/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Manage administrator accounts
    Admin(commands::admin::AdminArgs),
    /// Manage gymtrack configuration (path, show, init)
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let config_path = cli.config.unwrap_or_else(GymConfig::config_path);
    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config_path).await,
        Commands::Admin(args) => commands::run_admin(args, &config_path).await,
        Commands::Config(args) => commands::run_config(args, &config_path),
    };

    tracing_setup::shutdown_otel();
    result
}
