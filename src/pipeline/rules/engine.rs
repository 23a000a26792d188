//! Validation batch runner.
//!
//! Applies the validator to every candidate, in order. Each candidate leaves
//! as exactly one `ValidatedDiagnosis` (VALIDATED or FLAGGED) or, when refuted
//! by data, not at all. Records are always rebuilt, never mutated in place.

use crate::config::{FLAGGED_CONFIDENCE_FACTOR, FLAGGED_CONFIDENCE_FLOOR};
use crate::models::{
    CandidateDiagnosis, PatientRecord, Severity, ValidatedDiagnosis, ValidationStatus,
};

use super::measurements::{extract_measurements, MeasurementMap};
use super::types::{RejectedDiagnosis, ValidationCounts, ValidationOutcome, ValidationVerdict};
use super::validator::validate_diagnosis;

/// The validation stage seam used by the pipeline orchestrator.
pub trait RuleEngine: Send + Sync {
    fn validate(
        &self,
        record: &PatientRecord,
        candidates: &[CandidateDiagnosis],
    ) -> ValidationOutcome;
}

/// The built-in rule catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRuleEngine;

impl RuleEngine for DefaultRuleEngine {
    fn validate(
        &self,
        record: &PatientRecord,
        candidates: &[CandidateDiagnosis],
    ) -> ValidationOutcome {
        validate_diagnoses_with_audit(record, candidates)
    }
}

/// Validate candidates against a record. Refuted diagnoses are dropped silently.
pub fn validate_diagnoses(
    record: &PatientRecord,
    candidates: &[CandidateDiagnosis],
) -> Vec<ValidatedDiagnosis> {
    validate_diagnoses_with_audit(record, candidates).diagnoses
}

/// Same as [`validate_diagnoses`], also returning the refuted candidates.
pub fn validate_diagnoses_with_audit(
    record: &PatientRecord,
    candidates: &[CandidateDiagnosis],
) -> ValidationOutcome {
    let measurements = extract_measurements(record);
    validate_against(&measurements, candidates)
}

/// Batch validation over an already extracted measurement map.
pub fn validate_against(
    measurements: &MeasurementMap,
    candidates: &[CandidateDiagnosis],
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    let mut counts = ValidationCounts::default();

    for candidate in candidates {
        let verdict = validate_diagnosis(&candidate.name, measurements);
        if verdict.rule_key.is_none() {
            counts.unruled += 1;
        }

        match apply_verdict(candidate, &verdict) {
            Decision::Keep(diagnosis) => {
                match diagnosis.validation_status {
                    ValidationStatus::Validated => counts.validated += 1,
                    ValidationStatus::Flagged => {
                        counts.flagged += 1;
                        tracing::debug!(
                            rule = verdict.rule_key.unwrap_or("none"),
                            severity = %verdict.severity,
                            "Diagnosis flagged: insufficient data"
                        );
                    }
                }
                outcome.diagnoses.push(diagnosis);
            }
            Decision::Drop(rejected) => {
                counts.rejected += 1;
                tracing::debug!(
                    rule = %rejected.rule_key,
                    severity = %verdict.severity,
                    "Diagnosis rejected by clinical rule"
                );
                outcome.rejected.push(rejected);
            }
        }
    }

    tracing::info!(
        processed = counts.total(),
        measurements = measurements.len(),
        validated = counts.validated,
        flagged = counts.flagged,
        rejected = counts.rejected,
        unruled = counts.unruled,
        "Clinical rule validation complete"
    );

    outcome
}

enum Decision {
    Keep(ValidatedDiagnosis),
    Drop(RejectedDiagnosis),
}

/// Turn a verdict into the kept record, or a rejection for CRITICAL refutations.
fn apply_verdict(candidate: &CandidateDiagnosis, verdict: &ValidationVerdict) -> Decision {
    if verdict.is_valid {
        return Decision::Keep(ValidatedDiagnosis {
            name: candidate.name.clone(),
            confidence: candidate.confidence.min(verdict.max_confidence),
            evidence: candidate.evidence.clone(),
            validation_status: ValidationStatus::Validated,
            rule_engine_notes: verdict.notes.clone(),
        });
    }

    if verdict.severity == Severity::Critical {
        return Decision::Drop(RejectedDiagnosis {
            name: candidate.name.clone(),
            original_confidence: candidate.confidence,
            rule_key: verdict.rule_key.unwrap_or_default().to_string(),
            reason: verdict.reason.clone(),
            notes: verdict.notes.clone(),
        });
    }

    Decision::Keep(ValidatedDiagnosis {
        name: candidate.name.clone(),
        confidence: flagged_confidence(candidate.confidence),
        evidence: candidate.evidence.clone(),
        validation_status: ValidationStatus::Flagged,
        rule_engine_notes: format!("WARNING: {}", verdict.reason),
    })
}

/// Confidence for a kept-but-unconfirmed diagnosis: `max(0.1, c × 0.3)`.
pub fn flagged_confidence(original: f64) -> f64 {
    (original * FLAGGED_CONFIDENCE_FACTOR).max(FLAGGED_CONFIDENCE_FLOOR)
}
