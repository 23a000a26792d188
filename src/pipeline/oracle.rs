//! Seams to the reasoning oracles and parsing of their JSON replies.
//!
//! The crate ships no model client. Callers implement these traits over
//! whatever backend they run and complete any I/O before returning.

use serde::Deserialize;

use crate::models::{
    lenient_string, Advisory, CandidateDiagnosis, PatientRecord, RiskFlag, Urgency,
    ValidatedDiagnosis,
};

use super::error::PipelineError;

/// Proposes candidate diagnoses for a record.
pub trait DiagnosisOracle: Send + Sync {
    fn propose(&self, record: &PatientRecord) -> Result<Vec<CandidateDiagnosis>, PipelineError>;
}

/// Raises red flags over the validated diagnoses.
pub trait RiskOracle: Send + Sync {
    fn flag(
        &self,
        record: &PatientRecord,
        diagnoses: &[ValidatedDiagnosis],
    ) -> Result<Vec<RiskFlag>, PipelineError>;
}

/// Writes the advisory report.
pub trait AdvisoryOracle: Send + Sync {
    fn advise(
        &self,
        record: &PatientRecord,
        diagnoses: &[ValidatedDiagnosis],
        flags: &[RiskFlag],
    ) -> Result<Advisory, PipelineError>;
}

/// Strip a ```json fence if the model wrapped its reply in one. The language
/// tag is matched case-insensitively.
fn json_payload(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let body = &trimmed[start + 3..];
    let body = match body.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &body[4..],
        _ => body,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse `{"diagnoses": [...]}`.
///
/// Elements that are not objects become default candidates (empty name, zero
/// confidence) instead of failing the batch. Within an object each field is
/// read leniently, so a bad `evidence` never costs the candidate its name.
pub fn parse_diagnoses_response(response: &str) -> Result<Vec<CandidateDiagnosis>, PipelineError> {
    #[derive(Deserialize)]
    struct RawResponse {
        #[serde(default)]
        diagnoses: Option<Vec<serde_json::Value>>,
    }

    let raw: RawResponse = serde_json::from_str(json_payload(response))?;
    let candidates: Vec<CandidateDiagnosis> = raw
        .diagnoses
        .unwrap_or_default()
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect();

    tracing::debug!(count = candidates.len(), "Parsed oracle diagnoses");
    Ok(candidates)
}

/// Parse `{"flags": [{"name", "urgency", "rationale"}]}`. Unknown urgency reads as Low.
pub fn parse_flags_response(response: &str) -> Result<Vec<RiskFlag>, PipelineError> {
    #[derive(Deserialize, Default)]
    struct RawFlag {
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
        #[serde(default, deserialize_with = "lenient_string")]
        urgency: String,
        #[serde(default, deserialize_with = "lenient_string")]
        rationale: String,
    }

    #[derive(Deserialize)]
    struct RawResponse {
        #[serde(default)]
        flags: Option<Vec<serde_json::Value>>,
    }

    let raw: RawResponse = serde_json::from_str(json_payload(response))?;
    Ok(raw
        .flags
        .unwrap_or_default()
        .into_iter()
        .map(|v| serde_json::from_value::<RawFlag>(v).unwrap_or_default())
        .filter(|f| !f.name.trim().is_empty())
        .map(|f| RiskFlag {
            urgency: Urgency::from_label(&f.urgency),
            name: f.name,
            rationale: f.rationale,
        })
        .collect())
}

/// Parse the advisory JSON. Every key is optional.
pub fn parse_advisory_response(response: &str) -> Result<Advisory, PipelineError> {
    Ok(serde_json::from_str(json_payload(response))?)
}
