//! Test doubles for the document store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Document;
use super::document_store::{CollectionQuery, DocumentStore};
use super::errors::StoreError;
use super::in_memory::InMemoryDocumentStore;
use super::paths::{CollectionPath, DocumentPath};

/// In-memory store that fails writes under configured path prefixes
#[derive(Debug, Clone, Default)]
pub struct FaultyDocumentStore {
    inner: InMemoryDocumentStore,
    failing_prefixes: Arc<Mutex<Vec<String>>>,
    write_attempts: Arc<AtomicUsize>,
}

impl FaultyDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write below `prefix` fail with `StoreError::Unavailable`
    pub fn fail_writes_under(self, prefix: &str) -> Self {
        if let Ok(mut prefixes) = self.failing_prefixes.lock() {
            prefixes.push(prefix.to_string());
        }
        self
    }

    /// The wrapped store, for inspecting what was actually written
    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }

    /// Number of add/set/update calls seen, failed ones included
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn check(&self, path: &str) -> Result<(), StoreError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        let prefixes = self.failing_prefixes.lock()?;
        if prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return Err(StoreError::Unavailable(format!("injected failure for '{}'", path)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyDocumentStore {
    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<Document, StoreError> {
        self.check(collection.as_str())?;
        self.inner.add(collection, data).await
    }

    async fn set(&self, path: &DocumentPath, data: Value) -> Result<(), StoreError> {
        self.check(path.as_str())?;
        self.inner.set(path, data).await
    }

    async fn update(&self, path: &DocumentPath, fields: Value) -> Result<(), StoreError> {
        self.check(path.as_str())?;
        self.inner.update(path, fields).await
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        self.inner.get(path).await
    }

    async fn query(&self, collection: &CollectionPath, query: &CollectionQuery) -> Result<Vec<Document>, StoreError> {
        self.inner.query(collection, query).await
    }

    fn backend_name(&self) -> &'static str {
        "faulty-memory"
    }
}
