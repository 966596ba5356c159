use std::fmt;

use super::errors::StoreError;

/// Path to a collection: an odd number of segments, e.g. `users/u1/healthData`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

/// Path to a document: an even number of segments, e.g. `realTimeData/u1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath(String);

fn split_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(StoreError::InvalidPath(format!("empty segment in '{}'", path)));
    }
    Ok(segments)
}

/// Check that a single id can be used as a path segment
pub(crate) fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.trim().is_empty() || segment.contains('/') {
        return Err(StoreError::InvalidPath(format!("invalid path segment '{}'", segment)));
    }
    Ok(())
}

impl CollectionPath {
    /// Parse a collection path
    pub fn new(path: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        let segments = split_segments(&path)?;
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(format!("'{}' is a document path, not a collection", path)));
        }
        Ok(Self(path))
    }

    /// Path of a document inside this collection
    pub fn doc(&self, id: &str) -> Result<DocumentPath, StoreError> {
        validate_segment(id)?;
        Ok(DocumentPath(format!("{}/{}", self.0, id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocumentPath {
    /// Parse a document path
    pub fn new(path: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        let segments = split_segments(&path)?;
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(format!("'{}' is a collection path, not a document", path)));
        }
        Ok(Self(path))
    }

    /// Last segment of the path
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Collection holding this document
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(String::new()),
        }
    }

    /// Sub-collection nested under this document
    pub fn collection(&self, name: &str) -> Result<CollectionPath, StoreError> {
        validate_segment(name)?;
        Ok(CollectionPath(format!("{}/{}", self.0, name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_and_document_parity() {
        assert!(CollectionPath::new("users").is_ok());
        assert!(CollectionPath::new("users/u1/healthData").is_ok());
        assert!(CollectionPath::new("users/u1").is_err());

        assert!(DocumentPath::new("users/u1").is_ok());
        assert!(DocumentPath::new("users").is_err());
        assert!(DocumentPath::new("users//u1").is_err());
    }

    #[test]
    fn test_navigation() {
        let user = DocumentPath::new("users/u1").unwrap();
        let history = user.collection("healthData").unwrap();
        assert_eq!(history.as_str(), "users/u1/healthData");

        let entry = history.doc("abc").unwrap();
        assert_eq!(entry.id(), "abc");
        assert_eq!(entry.parent(), history);
    }

    #[test]
    fn test_segment_cannot_contain_slash() {
        let users = CollectionPath::new("users").unwrap();
        assert!(users.doc("a/b").is_err());
        assert!(users.doc("").is_err());
    }
}
