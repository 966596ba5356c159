use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Personal details of the patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    #[validate(length(max = 200, message = "Full name cannot exceed 200 characters"))]
    pub full_name: String,

    #[validate(length(max = 320, message = "Email cannot exceed 320 characters"))]
    pub email: String,

    #[validate(length(max = 40, message = "Phone cannot exceed 40 characters"))]
    pub phone: String,

    #[validate(length(max = 40, message = "Date of birth cannot exceed 40 characters"))]
    pub date_of_birth: String,

    #[validate(length(max = 500, message = "Address cannot exceed 500 characters"))]
    pub address: String,
}

/// Medical background
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct MedicalInfo {
    #[validate(length(max = 100, message = "At most 100 conditions"))]
    pub conditions: Vec<String>,

    #[validate(length(max = 100, message = "At most 100 medications"))]
    pub medications: Vec<String>,

    #[validate(length(max = 100, message = "At most 100 allergies"))]
    pub allergies: Vec<String>,
}

/// Who to call in an emergency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct EmergencyContact {
    #[validate(length(max = 200, message = "Contact name cannot exceed 200 characters"))]
    pub name: String,

    #[validate(length(max = 40, message = "Contact phone cannot exceed 40 characters"))]
    pub phone: String,
}

/// Emergency sharing preferences; everything is opted in by default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct EmergencyPreferences {
    pub auto_alert: bool,
    pub share_location: bool,
    pub share_medical_info: bool,
}

impl Default for EmergencyPreferences {
    fn default() -> Self {
        Self {
            auto_alert: true,
            share_location: true,
            share_medical_info: true,
        }
    }
}

/// The patient's profile document, read and written wholesale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    #[validate]
    pub personal_info: PersonalInfo,

    #[validate]
    pub medical_info: MedicalInfo,

    #[validate]
    pub emergency_contact: EmergencyContact,

    pub emergency_preferences: EmergencyPreferences,
}
