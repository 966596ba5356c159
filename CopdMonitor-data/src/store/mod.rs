// Document store module structure
pub mod errors;
pub mod layout;
mod document_store;
mod in_memory;
mod ordering;
mod paths;
#[cfg(feature = "sqlite")]
mod sqlite;

// Re-export commonly used types
pub use errors::StoreError;
pub use document_store::{CollectionQuery, DocumentStore};
pub use in_memory::InMemoryDocumentStore;
pub use paths::{CollectionPath, DocumentPath};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDocumentStore;

// Test doubles, exported for downstream crates when the mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod mock;
