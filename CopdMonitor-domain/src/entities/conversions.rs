use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use copd_monitor_data::models::Document;

use crate::entities::history::HistoryRecord;
use crate::entities::profile::UserProfile;
use crate::entities::vitals::VitalsReading;

/// Conversion functions between domain entities and stored documents.
/// These follow the pattern convert_to_[target]_[model].

/// Format a write time the way documents store it (RFC 3339, millisecond precision, `Z`)
///
/// Fixed width keeps lexicographic and chronological order identical.
pub fn format_document_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of a history entry: the reading plus its write time
pub fn convert_to_history_document(reading: &VitalsReading, created_at: DateTime<Utc>) -> Value {
    let mut body = reading_fields(reading);
    body["createdAt"] = json!(format_document_time(created_at));
    body
}

/// Body of the latest-reading document: the reading plus its write time
pub fn convert_to_latest_document(reading: &VitalsReading, last_updated: DateTime<Utc>) -> Value {
    let mut body = reading_fields(reading);
    body["lastUpdated"] = json!(format_document_time(last_updated));
    body
}

fn reading_fields(reading: &VitalsReading) -> Value {
    json!({
        "heartRate": reading.heart_rate,
        "spO2": reading.spo2,
        "respiration": reading.respiration_rate,
        "timestamp": reading.captured_at.timestamp_millis(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHistoryEntry {
    #[serde(flatten)]
    reading: VitalsReading,
    created_at: DateTime<Utc>,
}

/// Convert a stored history document back into a domain record
pub fn convert_to_domain_history_record(document: Document) -> Result<HistoryRecord, String> {
    let entry: StoredHistoryEntry = serde_json::from_value(document.data)
        .map_err(|e| format!("Malformed history entry {}: {}", document.path, e))?;

    Ok(HistoryRecord {
        id: document.id,
        reading: entry.reading,
        created_at: entry.created_at,
    })
}

/// Convert a stored profile document into the domain profile, defaulting absent sections
pub fn convert_to_domain_profile(document: Option<Document>) -> Result<UserProfile, String> {
    match document {
        Some(document) => serde_json::from_value(document.data)
            .map_err(|e| format!("Malformed profile {}: {}", document.path, e)),
        None => Ok(UserProfile::default()),
    }
}

/// Initial profile document written at sign-up.
///
/// Name and email are also kept at the top level of the document.
pub fn convert_to_new_profile_document(profile: &UserProfile, created_at: DateTime<Utc>) -> Result<Value, String> {
    let mut body = serde_json::to_value(profile).map_err(|e| e.to_string())?;
    body["fullName"] = json!(profile.personal_info.full_name);
    body["email"] = json!(profile.personal_info.email);
    body["createdAt"] = json!(format_document_time(created_at));
    Ok(body)
}

/// Fields written when a profile is saved; the four sections plus `updatedAt`
pub fn convert_to_profile_update(profile: &UserProfile, updated_at: DateTime<Utc>) -> Result<Value, String> {
    let mut body = serde_json::to_value(profile).map_err(|e| e.to_string())?;
    body["updatedAt"] = json!(format_document_time(updated_at));
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading() -> VitalsReading {
        VitalsReading::new(72, 97, 16, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
    }

    #[test]
    fn test_history_document_shape() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let body = convert_to_history_document(&reading(), created_at);

        assert_eq!(body["heartRate"], 72);
        assert_eq!(body["spO2"], 97);
        assert_eq!(body["respiration"], 16);
        assert_eq!(body["timestamp"], 1_700_000_000_000i64);
        assert_eq!(body["createdAt"], "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_latest_document_uses_last_updated() {
        let body = convert_to_latest_document(&reading(), Utc::now());
        assert!(body.get("lastUpdated").is_some());
        assert!(body.get("createdAt").is_none());
    }

    #[test]
    fn test_history_record_round_trip_through_document() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let document = Document {
            id: "entry-1".to_string(),
            path: "users/u1/healthData/entry-1".to_string(),
            data: convert_to_history_document(&reading(), created_at),
        };

        let record = convert_to_domain_history_record(document).unwrap();
        assert_eq!(record.id, "entry-1");
        assert_eq!(record.reading, reading());
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn test_malformed_history_entry_is_reported() {
        let document = Document {
            id: "bad".to_string(),
            path: "users/u1/healthData/bad".to_string(),
            data: json!({"heartRate": "fast"}),
        };
        let err = convert_to_domain_history_record(document).unwrap_err();
        assert!(err.contains("users/u1/healthData/bad"));
    }

    #[test]
    fn test_missing_profile_is_default() {
        assert_eq!(convert_to_domain_profile(None).unwrap(), UserProfile::default());
    }
}
