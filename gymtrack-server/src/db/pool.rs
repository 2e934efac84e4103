//! Postgres pool behind `PgStore`
//!
//! Sized from the `[database]` config section. Acquiring a connection gives
//! up after `ACQUIRE_TIMEOUT`, so a down database fails requests with a 500
//! instead of stalling them.

use std::time::Duration;

use gymtrack_core::config::DatabaseSection;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn pool_options(section: &DatabaseSection) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(section.max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connect using the `[database]` section.
pub async fn connect(section: &DatabaseSection) -> Result<PgPool, sqlx::Error> {
    let options = pool_options(section);
    let max_connections = options.get_max_connections();
    let pool = options.connect(&section.url).await?;
    tracing::info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Connect to `database_url` with default sizing.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    connect(&DatabaseSection {
        url: database_url.to_owned(),
        ..DatabaseSection::default()
    })
    .await
}
