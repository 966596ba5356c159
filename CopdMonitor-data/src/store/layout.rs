//! Per-user document layout.
//!
//! - `users/{uid}`: profile document
//! - `users/{uid}/healthData/{id}`: append-only vitals history
//! - `realTimeData/{uid}`: latest reading, overwritten on every sample

use super::errors::StoreError;
use super::paths::{CollectionPath, DocumentPath};

pub const USERS: &str = "users";
pub const HEALTH_DATA: &str = "healthData";
pub const REAL_TIME_DATA: &str = "realTimeData";

/// Profile document of a user
pub fn user_profile(uid: &str) -> Result<DocumentPath, StoreError> {
    CollectionPath::new(USERS)?.doc(uid)
}

/// History collection of a user
pub fn health_history(uid: &str) -> Result<CollectionPath, StoreError> {
    user_profile(uid)?.collection(HEALTH_DATA)
}

/// Latest-reading document of a user
pub fn latest_reading(uid: &str) -> Result<DocumentPath, StoreError> {
    CollectionPath::new(REAL_TIME_DATA)?.doc(uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        assert_eq!(user_profile("u1").unwrap().as_str(), "users/u1");
        assert_eq!(health_history("u1").unwrap().as_str(), "users/u1/healthData");
        assert_eq!(latest_reading("u1").unwrap().as_str(), "realTimeData/u1");
    }

    #[test]
    fn test_rejects_bad_user_id() {
        assert!(user_profile("").is_err());
        assert!(latest_reading("a/b").is_err());
    }
}
