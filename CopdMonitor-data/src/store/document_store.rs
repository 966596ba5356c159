use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Document, SortDirection};
use super::errors::StoreError;
use super::paths::{CollectionPath, DocumentPath};

/// Ordering and size limits for a collection query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    /// Top-level field to order by; path order when absent
    pub order_by: Option<String>,
    /// Direction applied to `order_by`
    pub direction: SortDirection,
    /// Maximum number of documents returned
    pub limit: Option<usize>,
}

impl CollectionQuery {
    /// Order by a top-level field
    pub fn order_by(field: &str, direction: SortDirection) -> Result<Self, StoreError> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::InvalidDocument(format!("unsupported order field '{}'", field)));
        }
        Ok(Self {
            order_by: Some(field.to_string()),
            direction,
            limit: None,
        })
    }

    /// Cap the number of returned documents
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Schema-less document store addressed by collection/document paths
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a document with a generated id to a collection
    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<Document, StoreError>;

    /// Create or overwrite a document
    async fn set(&self, path: &DocumentPath, data: Value) -> Result<(), StoreError>;

    /// Merge top-level fields into an existing document
    async fn update(&self, path: &DocumentPath, fields: Value) -> Result<(), StoreError>;

    /// Read a document
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    /// List documents of a collection
    async fn query(&self, collection: &CollectionPath, query: &CollectionQuery) -> Result<Vec<Document>, StoreError>;

    /// Short backend name for logs and health reporting
    fn backend_name(&self) -> &'static str;
}

/// Reject bodies that are not JSON objects
pub(crate) fn ensure_object(path: &str, data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument(format!("body for '{}' must be a JSON object", path)))
    }
}

/// Shallow merge of `fields` into `target`; both must be objects
pub(crate) fn merge_fields(target: &mut Value, fields: Value) {
    if let (Some(target), Value::Object(fields)) = (target.as_object_mut(), fields) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}
