use std::sync::PoisonError;
use thiserror::Error;

/// Error type for document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Path does not follow the collection/document layout
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Document body is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Backend refused or failed the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(error: PoisonError<T>) -> Self {
        StoreError::Lock(error.to_string())
    }
}
