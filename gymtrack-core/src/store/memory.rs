//! In-process document store
//!
//! Backs `gymtrack serve --memory` and the test suites. Query semantics match
//! the Postgres store: same-typed filters, sort-field presence, id tiebreak,
//! and jsonb's cross-type order when a sort field holds mixed types. Arrays and
//! objects of the same type compare equal here.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DocumentStore;
use crate::document::{compare_values, Document, Fields};
use crate::error::{Result, StoreError};
use crate::query::{CollectionQuery, Direction};

/// Collections keyed by name, documents keyed by id
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Insert a document under a caller-chosen id, replacing any previous one.
    pub async fn put(&self, collection: &str, id: impl Into<String>, fields: Fields) -> Document {
        let id = id.into();
        self.collections
            .write()
            .await
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), fields.clone());
        Document::new(id, fields)
    }
}

/// Rank of a value's type in jsonb ordering: null < string < number < boolean < array < object.
fn jsonb_type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn sort_key_cmp(a: &Document, b: &Document, field: &str) -> Ordering {
    let by_field = match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => compare_values(x, y)
            .unwrap_or_else(|| jsonb_type_rank(x).cmp(&jsonb_type_rank(y))),
        _ => Ordering::Equal,
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Document> = docs
            .iter()
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .filter(|doc| query.filters.iter().all(|f| f.matches(doc)))
            .collect();

        if let Some(order) = &query.order_by {
            matched.retain(|doc| doc.get(&order.field).is_some());
            matched.sort_by(|a, b| {
                let ord = sort_key_cmp(a, b, &order.field);
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        Ok(self.put(collection, id, fields).await)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Document> {
        let mut collections = self.collections.write().await;
        let fields = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        for (key, value) in patch {
            fields.insert(key, value);
        }
        Ok(Document::new(id, fields.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }
}
