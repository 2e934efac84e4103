//! gymtrack-core: documents, stores, and the paginated collection cache
//!
//! The HTTP service (gymtrack-server) and the CLI build on these pieces:
//! - `document`: document model and field encoding
//! - `query`: filters, collection queries, query descriptors
//! - `store`: the `DocumentStore` trait and an in-memory backend
//! - `pager` / `paginated`: local page slicing over a cached dataset
//! - `config`: TOML configuration

pub mod config;
pub mod document;
pub mod error;
pub mod pager;
pub mod paginated;
pub mod query;
pub mod store;

pub use config::GymConfig;
pub use document::{to_fields, timestamp_string, timestamp_value, Document, Fields};
pub use error::{Result, StoreError};
pub use pager::{PageBounds, Pager};
pub use paginated::{PageView, PaginatedCollection};
pub use query::{CollectionQuery, Direction, Filter, FilterOp, QueryDescriptor};
pub use store::{DocumentStore, MemoryStore};
