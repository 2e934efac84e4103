//! Database layer - connection pool, schema and the Postgres document store
//!
//! Every collection lives in one `documents` table keyed by
//! `(collection, id)` with the record body in a JSONB column.

pub mod migrations;
pub mod pg_store;
pub mod pool;

pub use pg_store::PgStore;
pub use pool::{connect, create_pool};
