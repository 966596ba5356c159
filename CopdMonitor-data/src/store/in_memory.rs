use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::models::Document;
use super::document_store::{ensure_object, merge_fields, CollectionQuery, DocumentStore};
use super::errors::StoreError;
use super::ordering::{apply_direction, compare_fields};
use super::paths::{CollectionPath, DocumentPath};

/// In-memory document store, used in tests and when no database is configured
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    /// Documents keyed by full path
    documents: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Number of stored documents across all collections
    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<Document, StoreError> {
        let path = collection.doc(&Uuid::new_v4().to_string())?;
        ensure_object(path.as_str(), &data)?;

        let mut store = self.documents.lock()?;
        store.insert(path.to_string(), data.clone());
        debug!("Added document {}", path);

        Ok(Document {
            id: path.id().to_string(),
            path: path.to_string(),
            data,
        })
    }

    async fn set(&self, path: &DocumentPath, data: Value) -> Result<(), StoreError> {
        ensure_object(path.as_str(), &data)?;

        let mut store = self.documents.lock()?;
        store.insert(path.to_string(), data);
        debug!("Set document {}", path);
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Value) -> Result<(), StoreError> {
        ensure_object(path.as_str(), &fields)?;

        let mut store = self.documents.lock()?;
        let existing = store
            .get_mut(path.as_str())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        merge_fields(existing, fields);
        debug!("Updated document {}", path);
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let store = self.documents.lock()?;
        Ok(store.get(path.as_str()).map(|data| Document {
            id: path.id().to_string(),
            path: path.to_string(),
            data: data.clone(),
        }))
    }

    async fn query(&self, collection: &CollectionPath, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        let store = self.documents.lock()?;

        let mut documents: Vec<Document> = store
            .iter()
            .filter_map(|(path, data)| {
                let path = DocumentPath::new(path.clone()).ok()?;
                if path.parent() != *collection {
                    return None;
                }
                Some(Document {
                    id: path.id().to_string(),
                    path: path.to_string(),
                    data: data.clone(),
                })
            })
            .collect();

        if let Some(field) = &query.order_by {
            documents.sort_by(|a, b| {
                apply_direction(compare_fields(a.field(field), b.field(field)), query.direction)
            });
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
