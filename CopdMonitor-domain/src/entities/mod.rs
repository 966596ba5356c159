// Domain entities and value objects
pub mod analysis;
pub mod conversions;
pub mod history;
pub mod profile;
pub mod vitals;

// Re-export common types for easier imports
pub use analysis::{AnalysisResult, RiskLevel};
pub use history::{HistoryRecord, HistoryStats, VitalKind, VitalStatus};
pub use profile::{EmergencyContact, EmergencyPreferences, MedicalInfo, PersonalInfo, UserProfile};
pub use vitals::VitalsReading;
