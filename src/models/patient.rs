use serde::{Deserialize, Serialize};

use super::enums::Sex;
use super::nullable_string;

/// Vitals the caller already parsed into numbers.
///
/// Upstream intake forms use `resp_rate`; both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredVitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, alias = "resp_rate", skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
}

/// Demographics plus any pre-structured vitals (the `patient` object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(flatten)]
    pub vitals: StructuredVitals,
}

/// Normalized patient record handed to the reasoning stages and the rule engine.
/// Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub patient: Option<PatientInfo>,
    /// Free-text narrative (symptoms, history).
    #[serde(default, deserialize_with = "nullable_string")]
    pub symptom_notes: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub vitals: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub labs: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub medications: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub imaging: String,
}

impl PatientRecord {
    /// Structured vitals, if the caller supplied a `patient` object.
    pub fn structured_vitals(&self) -> Option<&StructuredVitals> {
        self.patient.as_ref().map(|p| &p.vitals)
    }
}
