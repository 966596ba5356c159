use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use copd_monitor_domain::entities::EmergencyContact;

/// Body of the sign-up profile creation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}
