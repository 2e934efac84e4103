//! Postgres-backed `DocumentStore`
//!
//! Filters compile to `jsonb` comparisons guarded by `jsonb_typeof`, so a
//! filter only matches values of its own JSON type, the same as the
//! in-memory store. Ordering skips documents without the sort field and
//! breaks ties by id.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use gymtrack_core::document::type_name;
use gymtrack_core::query::OrderBy;
use gymtrack_core::{CollectionQuery, Direction, Document, DocumentStore, Fields, Result, StoreError};

/// Document store over the `documents` table
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_document(id: String, fields: Value) -> Result<Document> {
    match fields {
        Value::Object(map) => Ok(Document::new(id, map)),
        other => Err(StoreError::malformed(
            id,
            format!("expected an object, found {}", type_name(&other)),
        )),
    }
}

fn write_error(collection: &str, err: sqlx::Error) -> StoreError {
    let unique = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        StoreError::conflict(collection, err)
    } else {
        StoreError::backend(err)
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, order: &OrderBy) {
    let dir = match order.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };
    qb.push(" AND fields ? ");
    qb.push_bind(order.field.clone());
    qb.push(" ORDER BY fields -> ");
    qb.push_bind(order.field.clone());
    qb.push(format!(" {dir}, id {dir}"));
}

/// Build the SELECT for `query`.
fn select(query: &CollectionQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT id, fields FROM documents WHERE collection = ");
    qb.push_bind(query.collection.clone());

    for filter in &query.filters {
        qb.push(" AND jsonb_typeof(fields -> ");
        qb.push_bind(filter.field.clone());
        qb.push(") = ");
        qb.push_bind(type_name(&filter.value));
        qb.push(" AND (fields -> ");
        qb.push_bind(filter.field.clone());
        qb.push(") ");
        qb.push(filter.op.as_sql());
        qb.push(" ");
        qb.push_bind(Json(filter.value.clone()));
    }

    match &query.order_by {
        Some(order) => push_order(&mut qb, order),
        None => {
            qb.push(" ORDER BY id");
        }
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    qb
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>> {
        let rows: Vec<(String, Json<Value>)> = select(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        tracing::debug!(
            collection = %query.collection,
            filters = query.filters.len(),
            rows = rows.len(),
            "document query"
        );

        rows.into_iter()
            .map(|(id, Json(fields))| into_document(id, fields))
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row: Option<(String, Json<Value>)> =
            sqlx::query_as("SELECT id, fields FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        row.map(|(id, Json(fields))| into_document(id, fields))
            .transpose()
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(&fields))
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(collection, e))?;

        Ok(Document::new(id, fields))
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Document> {
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r#"
            UPDATE documents
            SET fields = fields || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING fields
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(collection, e))?;

        match row {
            Some((Json(fields),)) => into_document(id.to_owned(), fields),
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }
}
