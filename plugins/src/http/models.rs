use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiExplanation {
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineDetails {
    pub medicine: Medicine,
    #[serde(default)]
    pub ai_explanation: Option<AiExplanation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub coverage_amount: f64,
    #[serde(default)]
    pub premium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendations {
    #[serde(default)]
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceRecommendations {
    #[serde(default)]
    pub available_plans: Vec<InsurancePlan>,
    #[serde(default)]
    pub ai_recommendations: Option<AiRecommendations>,
}

/// `schemes` is model-generated; usually text, occasionally structured JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernmentSchemes {
    #[serde(default)]
    pub schemes: Option<serde_json::Value>,
}

impl GovernmentSchemes {
    pub fn text(&self) -> Option<String> {
        match self.schemes.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => serde_json::to_string_pretty(other).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionAnalysis {
    #[serde(default)]
    pub analysis: Option<Analysis>,
}
