// Storage models
pub mod document;

pub use document::{Document, SortDirection};
