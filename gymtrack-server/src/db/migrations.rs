//! Schema for the document table

use sqlx::PgPool;

/// Create the document table and its indexes if missing.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("running document store migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            fields JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One member per identity document
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_document
        ON documents ((fields ->> 'document'))
        WHERE collection = 'users'
        "#,
    )
    .execute(pool)
    .await?;

    // One account per admin username
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_admin_username
        ON documents ((fields ->> 'username'))
        WHERE collection = 'admin'
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("document store migrations complete");
    Ok(())
}
