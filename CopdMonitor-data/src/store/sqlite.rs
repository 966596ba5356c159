use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::database::SqlitePool;
use crate::models::{Document, SortDirection};
use super::document_store::{ensure_object, merge_fields, CollectionQuery, DocumentStore};
use super::errors::StoreError;
use super::paths::{CollectionPath, DocumentPath};

/// Document store persisted in SQLite, one row per document
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Create a store over an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn write(&self, path: &DocumentPath, data: &Value) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO documents (path, collection, doc_id, data, written_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET data = excluded.data, written_at = excluded.written_at",
            params![
                path.as_str(),
                path.parent().as_str(),
                path.id(),
                serde_json::to_string(data)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn read(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError> {
        let conn = self.pool.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE path = ?1",
                params![path.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<Document, StoreError> {
        let path = collection.doc(&Uuid::new_v4().to_string())?;
        ensure_object(path.as_str(), &data)?;

        debug!("Storing document in database: {}", path);
        self.write(&path, &data)?;

        Ok(Document {
            id: path.id().to_string(),
            path: path.to_string(),
            data,
        })
    }

    async fn set(&self, path: &DocumentPath, data: Value) -> Result<(), StoreError> {
        ensure_object(path.as_str(), &data)?;
        debug!("Overwriting document in database: {}", path);
        self.write(path, &data)
    }

    async fn update(&self, path: &DocumentPath, fields: Value) -> Result<(), StoreError> {
        ensure_object(path.as_str(), &fields)?;

        let mut existing = self
            .read(path)?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        merge_fields(&mut existing, fields);

        debug!("Updating document in database: {}", path);
        self.write(path, &existing)
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        debug!("Getting document from database: {}", path);
        Ok(self.read(path)?.map(|data| Document {
            id: path.id().to_string(),
            path: path.to_string(),
            data,
        }))
    }

    async fn query(&self, collection: &CollectionPath, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        debug!("Querying collection from database: {}", collection);
        let conn = self.pool.get()?;

        // Direction cannot be bound as a parameter; field names are validated by CollectionQuery
        let order = match (&query.order_by, query.direction) {
            (Some(_), SortDirection::Ascending) => "ORDER BY json_extract(data, ?2) ASC, path ASC",
            (Some(_), SortDirection::Descending) => "ORDER BY json_extract(data, ?2) DESC, path ASC",
            (None, _) => "ORDER BY path ASC",
        };
        let sql = format!(
            "SELECT path, doc_id, data FROM documents WHERE collection = ?1 {} LIMIT ?3",
            order
        );

        let field_path = query
            .order_by
            .as_ref()
            .map(|field| format!("$.{}", field))
            .unwrap_or_default();
        // SQLite treats a negative LIMIT as unbounded
        let limit = query.limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![collection.as_str(), field_path, limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (path, id, raw) = row?;
            documents.push(Document {
                id,
                path,
                data: serde_json::from_str(&raw)?,
            });
        }

        Ok(documents)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
