use serde::{Deserialize, Serialize};

use super::enums::{Urgency, ValidationStatus};
use super::{lenient_string, nullable_string};

/// A diagnosis proposed by the reasoning oracle, before rule validation.
///
/// Deserialization is lenient: a missing name becomes `""`, a non-string name
/// or evidence is rendered as text, and a missing, non-numeric or non-finite
/// confidence becomes `0.0`. One malformed field never drops the candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateDiagnosis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Conventionally 0.0-1.0, but not clamped.
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub evidence: String,
}

impl CandidateDiagnosis {
    pub fn new(name: impl Into<String>, confidence: f64, evidence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            confidence,
            evidence: evidence.into(),
        }
    }
}

/// A diagnosis that survived the rule engine, with attenuated confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedDiagnosis {
    pub name: String,
    pub confidence: f64,
    pub evidence: String,
    pub validation_status: ValidationStatus,
    pub rule_engine_notes: String,
}

/// A red flag raised by the risk oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub name: String,
    pub urgency: Urgency,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryTrace {
    #[serde(default)]
    pub data_links: Vec<String>,
}

/// Advisory report produced by the advisory oracle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(default, deserialize_with = "nullable_string")]
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub trace: AdvisoryTrace,
}

/// Accepts a JSON number or a numeric string. Anything else, including
/// `"NaN"` and `"inf"`, reads as 0.0.
fn lenient_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let parsed = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|c| c.is_finite()).unwrap_or(0.0))
}
