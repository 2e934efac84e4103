//! Document store abstraction.
//!
//! The cache and the HTTP layer only talk to `dyn DocumentStore`; the
//! in-memory backend lives here, the Postgres one in gymtrack-server.

pub mod memory;

use async_trait::async_trait;

use crate::document::{Document, Fields};
use crate::error::Result;
use crate::query::CollectionQuery;

pub use memory::MemoryStore;

/// Backing store for collections of documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a filtered, optionally ordered and limited read.
    ///
    /// Filters match only same-typed values; ordering excludes documents
    /// missing the sort field and breaks ties by id in the same direction.
    async fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>>;

    /// Fetch one document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a document; the store assigns its id.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document>;

    /// Shallow-merge `patch` into an existing document.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Document>;

    /// Remove a document.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
