use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use copd_monitor_data::store::{layout, DocumentStore, StoreError};

use crate::entities::conversions::{
    convert_to_domain_profile, convert_to_new_profile_document, convert_to_profile_update,
};
use crate::entities::{EmergencyContact, PersonalInfo, UserProfile};

/// Profile service errors
#[derive(Debug, Error)]
pub enum ProfileServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No profile document for the user
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// Stored document could not be read
    #[error("Malformed profile: {0}")]
    Malformed(String),

    /// Store error
    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<StoreError> for ProfileServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => ProfileServiceError::NotFound(path),
            other => ProfileServiceError::StoreError(other.to_string()),
        }
    }
}

/// Flatten validator errors into one message per field
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join("; ")
}

fn collect_messages(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                let msgs: Vec<String> = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", name),
                    })
                    .collect();
                out.push(format!("{}: {}", name, msgs.join(", ")));
            }
            validator::ValidationErrorsKind::Struct(nested) => collect_messages(&name, nested, out),
            validator::ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", name, index), nested, out);
                }
            }
        }
    }
}

/// Reads and writes the user's profile document
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Write the initial profile at sign-up, overwriting any previous document
    pub async fn create_profile(
        &self,
        uid: &str,
        full_name: &str,
        email: &str,
        emergency_contact: EmergencyContact,
    ) -> Result<UserProfile, ProfileServiceError> {
        let profile = UserProfile {
            personal_info: PersonalInfo {
                full_name: full_name.to_string(),
                email: email.to_string(),
                ..PersonalInfo::default()
            },
            emergency_contact,
            ..UserProfile::default()
        };
        profile
            .validate()
            .map_err(|e| ProfileServiceError::ValidationError(validation_message(&e)))?;

        let body = convert_to_new_profile_document(&profile, Utc::now())
            .map_err(ProfileServiceError::Malformed)?;
        self.store.set(&layout::user_profile(uid)?, body).await?;

        info!("Created profile for {}", uid);
        Ok(profile)
    }

    /// Load the profile; absent sections and a missing document read as defaults
    pub async fn load_profile(&self, uid: &str) -> Result<UserProfile, ProfileServiceError> {
        let document = self.store.get(&layout::user_profile(uid)?).await?;
        convert_to_domain_profile(document).map_err(|e| {
            error!("Error fetching profile: {}", e);
            ProfileServiceError::Malformed(e)
        })
    }

    /// Save all four sections; the profile document must already exist
    pub async fn save_profile(&self, uid: &str, profile: UserProfile) -> Result<UserProfile, ProfileServiceError> {
        profile
            .validate()
            .map_err(|e| ProfileServiceError::ValidationError(validation_message(&e)))?;

        let fields = convert_to_profile_update(&profile, Utc::now())
            .map_err(ProfileServiceError::Malformed)?;
        self.store.update(&layout::user_profile(uid)?, fields).await?;

        info!("Profile updated for {}", uid);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copd_monitor_data::store::InMemoryDocumentStore;

    fn contact() -> EmergencyContact {
        EmergencyContact {
            name: "Grace".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = ProfileService::new(store.clone());

        service.create_profile("u1", "Ada Lovelace", "ada@example.org", contact()).await.unwrap();

        let profile = service.load_profile("u1").await.unwrap();
        assert_eq!(profile.personal_info.full_name, "Ada Lovelace");
        assert_eq!(profile.emergency_contact, contact());
        assert!(profile.emergency_preferences.share_location);

        let raw = store.get(&layout::user_profile("u1").unwrap()).await.unwrap().unwrap();
        assert_eq!(raw.data["fullName"], "Ada Lovelace");
        assert!(raw.data["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_missing_profile_loads_defaults() {
        let service = ProfileService::new(Arc::new(InMemoryDocumentStore::new()));
        assert_eq!(service.load_profile("nobody").await.unwrap(), UserProfile::default());
    }

    #[tokio::test]
    async fn test_save_requires_existing_document() {
        let service = ProfileService::new(Arc::new(InMemoryDocumentStore::new()));
        let result = service.save_profile("nobody", UserProfile::default()).await;
        assert!(matches!(result, Err(ProfileServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_updates_sections_and_keeps_other_fields() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = ProfileService::new(store.clone());
        service.create_profile("u1", "Ada", "ada@example.org", contact()).await.unwrap();

        let mut profile = service.load_profile("u1").await.unwrap();
        profile.medical_info.conditions.push("COPD stage II".to_string());
        profile.emergency_preferences.share_location = false;
        service.save_profile("u1", profile).await.unwrap();

        let reloaded = service.load_profile("u1").await.unwrap();
        assert_eq!(reloaded.medical_info.conditions, vec!["COPD stage II"]);
        assert!(!reloaded.emergency_preferences.share_location);

        let raw = store.get(&layout::user_profile("u1").unwrap()).await.unwrap().unwrap();
        assert!(raw.data["createdAt"].is_string());
        assert!(raw.data["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = ProfileService::new(store.clone());
        service.create_profile("u1", "Ada", "ada@example.org", contact()).await.unwrap();

        let mut profile = UserProfile::default();
        profile.personal_info.full_name = "x".repeat(201);

        match service.save_profile("u1", profile).await {
            Err(ProfileServiceError::ValidationError(msg)) => assert!(msg.contains("personal_info.full_name")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
