use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Risk level reported by the analysis endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Risk assessment returned by the remote model.
///
/// Replaced wholesale by every successful response; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall risk level
    pub risk_level: RiskLevel,

    /// Observations, in the order the model produced them
    #[serde(default)]
    pub insights: Vec<String>,

    /// Suggested actions, in the order the model produced them
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_endpoint_response() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "riskLevel": "medium",
            "insights": ["SpO2 trending down"],
            "recommendations": ["Use rescue inhaler", "Rest"]
        })).unwrap();

        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.recommendations, vec!["Use rescue inhaler", "Rest"]);
    }

    #[test]
    fn test_unknown_risk_level_is_rejected() {
        let result = serde_json::from_value::<AnalysisResult>(json!({"riskLevel": "severe"}));
        assert!(result.is_err());
    }
}
