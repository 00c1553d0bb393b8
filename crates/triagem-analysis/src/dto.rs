use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub message: String,
}

/// Symptom names are in canonical-name order; specialties are most probable first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub extracted_symptoms: Vec<String>,
    pub suggested_specialties: Vec<String>,
}
