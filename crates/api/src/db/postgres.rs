//! `PostgreSQL` document store.
//!
//! All collections share one `documents` table; bodies live in a JSONB
//! column and filters use JSONB containment (`body @> $filter`). Storage
//! order is the `seq` column.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use eko_store_core::DocumentId;

use super::{Document, DocumentStore, Filter, RepositoryError, StoredDocument};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new store on top of an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_body(value: Value) -> Result<Document, RepositoryError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RepositoryError::DataCorruption(format!(
            "document body is not an object: {other}"
        ))),
    }
}

fn stored_from_row(row: &PgRow) -> Result<StoredDocument, RepositoryError> {
    let id: DocumentId = row.try_get("id")?;
    let Json(body): Json<Value> = row.try_get("body")?;
    Ok(StoredDocument {
        id,
        body: into_body(body)?,
    })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY seq ASC
            ",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_from_row).collect()
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT body
            FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => {
                let Json(body): Json<Value> = r.try_get("body")?;
                Ok(Some(into_body(body)?))
            }
            None => Ok(None),
        }
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY seq ASC
            ",
        )
        .bind(collection)
        .bind(Json(filter.to_value()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_from_row).collect()
    }

    async fn insert(
        &self,
        collection: &str,
        body: Document,
    ) -> Result<DocumentId, RepositoryError> {
        let id = DocumentId::generate();
        sqlx::query(
            r"
            INSERT INTO documents (id, collection, body)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(id)
        .bind(collection)
        .bind(Json(Value::Object(body)))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        body: Document,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = $3
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(body)))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
