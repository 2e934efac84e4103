//! `gymtrack admin` - administrator accounts

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gymtrack_core::{to_fields, CollectionQuery, DocumentStore, Filter, GymConfig};
use gymtrack_server::db::{connect, migrations, PgStore};
use gymtrack_server::models::{AdminAccount, ADMINS, HASH_COST};

/// Environment variable supplying the password non-interactively
pub const PASSWORD_ENV: &str = "GYMTRACK_ADMIN_PASSWORD";

#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommands,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Create an administrator (password from $GYMTRACK_ADMIN_PASSWORD or a prompt)
    Add(AddArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Login name
    pub username: String,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_admin(args: AdminArgs, config_path: &Path) -> Result<()> {
    match args.command {
        AdminCommands::Add(args) => run_add(args, config_path).await,
    }
}

async fn run_add(args: AddArgs, config_path: &Path) -> Result<()> {
    let mut config = GymConfig::load_from(config_path)?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => inquire::Password::new("Password for the new administrator:")
            .prompt()
            .context("Failed to read password")?,
    };

    let pool = connect(&config.database)
        .await
        .context("Failed to create database pool")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;
    let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(pool));

    let account = create_admin(store.as_ref(), &args.username, password).await?;
    println!("Created administrator '{}'", account.username);
    Ok(())
}

/// Hash `password` and store a new administrator, refusing duplicates.
pub async fn create_admin(
    store: &dyn DocumentStore,
    username: &str,
    password: String,
) -> Result<AdminAccount> {
    let username = username.trim().to_owned();
    if username.is_empty() {
        anyhow::bail!("username cannot be empty");
    }
    if password.is_empty() {
        anyhow::bail!("password cannot be empty");
    }

    let existing = store
        .query(
            &CollectionQuery::new(ADMINS)
                .filter(Filter::eq("username", username.as_str()))
                .limit(1),
        )
        .await?;
    if !existing.is_empty() {
        anyhow::bail!("administrator '{}' already exists", username);
    }

    let hash_name = username.clone();
    let mut account =
        tokio::task::spawn_blocking(move || AdminAccount::new(&hash_name, &password, HASH_COST))
            .await
            .context("Password hashing task failed")?
            .context("Failed to hash password")?;

    let doc = store.insert(ADMINS, to_fields(&account)?).await?;
    account.id = doc.id;
    tracing::info!(username = %account.username, "administrator created");
    Ok(account)
}
