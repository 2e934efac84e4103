//! `gymtrack config` - locate, print and initialize the config file

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gymtrack_core::GymConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective configuration (file, defaults and env overrides)
    Show,
    /// Write a config file with default values
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, path: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(path),
        ConfigCommands::Init(args) => run_init(args, path),
    }
}

fn run_show(path: &Path) -> Result<()> {
    let config = GymConfig::load_from(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_init(args: InitArgs, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!(
            "Config already exists at {}\n\nUse --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(path, GymConfig::default().to_toml()?)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    tracing::info!(path = %path.display(), "config initialized");
    println!("Created config at: {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit the branch and equipment catalogs: $EDITOR {}", path.display());
    println!("  2. Create an administrator: gymtrack admin add <USERNAME>");
    println!("  3. Start the server: gymtrack serve");
    Ok(())
}
