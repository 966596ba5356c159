use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document: its id, full path and JSON body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Last path segment
    pub id: String,

    /// Full slash-separated path, e.g. `users/u1/healthData/abc`
    pub path: String,

    /// Document body; always a JSON object
    pub data: Value,
}

impl Document {
    /// Read a top-level field of the document body
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Ordering direction for collection queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Oldest / smallest first
    Ascending,
    /// Newest / largest first
    #[default]
    Descending,
}
