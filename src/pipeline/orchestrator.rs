//! End-to-end clinical pipeline.
//!
//! ingest → propose (oracle) → rule validation → risk flags (oracle) → advisory (oracle).
//! Risk and advisory stages only ever see the validated list.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Advisory, PatientRecord, RiskFlag, ValidatedDiagnosis};

use super::error::PipelineError;
use super::ingestion::{ingest, RawPatientInput};
use super::oracle::{AdvisoryOracle, DiagnosisOracle, RiskOracle};
use super::rules::{DefaultRuleEngine, RejectedDiagnosis, RuleEngine};

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub record: PatientRecord,
    pub diagnoses: Vec<ValidatedDiagnosis>,
    /// Candidates the rule engine refuted. Not passed to later stages.
    pub rejected: Vec<RejectedDiagnosis>,
    pub flags: Vec<RiskFlag>,
    pub advisory: Advisory,
    pub completed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

pub struct ClinicalPipeline<D, R, A, E = DefaultRuleEngine> {
    diagnosis: D,
    risk: R,
    advisory: A,
    rules: E,
}

impl<D, R, A> ClinicalPipeline<D, R, A>
where
    D: DiagnosisOracle,
    R: RiskOracle,
    A: AdvisoryOracle,
{
    /// Pipeline validating against the built-in rule catalog.
    pub fn new(diagnosis: D, risk: R, advisory: A) -> Self {
        Self {
            diagnosis,
            risk,
            advisory,
            rules: DefaultRuleEngine,
        }
    }
}

impl<D, R, A, E> ClinicalPipeline<D, R, A, E>
where
    D: DiagnosisOracle,
    R: RiskOracle,
    A: AdvisoryOracle,
    E: RuleEngine,
{
    /// Swap the validation stage.
    pub fn with_rule_engine<E2: RuleEngine>(self, rules: E2) -> ClinicalPipeline<D, R, A, E2> {
        ClinicalPipeline {
            diagnosis: self.diagnosis,
            risk: self.risk,
            advisory: self.advisory,
            rules,
        }
    }

    /// Run the full pipeline over raw intake.
    pub fn run(&self, raw: &RawPatientInput) -> Result<PipelineReport, PipelineError> {
        self.run_record(ingest(raw))
    }

    /// Run from an already structured record (skips ingestion).
    pub fn run_record(&self, record: PatientRecord) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();

        let candidates = self.diagnosis.propose(&record)?;
        tracing::info!(run_id = %run_id, stage = "analysis", count = candidates.len(), "Candidates proposed");

        let outcome = self.rules.validate(&record, &candidates);
        tracing::info!(
            run_id = %run_id,
            stage = "validation",
            kept = outcome.diagnoses.len(),
            rejected = outcome.rejected.len(),
            "Rule validation applied"
        );

        let flags = self.risk.flag(&record, &outcome.diagnoses)?;
        tracing::info!(run_id = %run_id, stage = "risk", count = flags.len(), "Red flags detected");

        let advisory = self.advisory.advise(&record, &outcome.diagnoses, &flags)?;
        tracing::info!(
            run_id = %run_id,
            stage = "advisory",
            recommendations = advisory.recommendations.len(),
            "Advisory generated"
        );

        Ok(PipelineReport {
            run_id,
            record,
            diagnoses: outcome.diagnoses,
            rejected: outcome.rejected,
            flags,
            advisory,
            completed_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::{CandidateDiagnosis, Urgency, ValidationStatus};
    use crate::pipeline::oracle::parse_diagnoses_response;
    use crate::pipeline::rules::ValidationOutcome;

    struct FixedDiagnoses(&'static str);

    impl DiagnosisOracle for FixedDiagnoses {
        fn propose(&self, _record: &PatientRecord) -> Result<Vec<CandidateDiagnosis>, PipelineError> {
            parse_diagnoses_response(self.0)
        }
    }

    struct FailingOracle;

    impl DiagnosisOracle for FailingOracle {
        fn propose(&self, _record: &PatientRecord) -> Result<Vec<CandidateDiagnosis>, PipelineError> {
            Err(PipelineError::Oracle("connection refused".into()))
        }
    }

    /// Records the diagnosis names it was shown.
    #[derive(Default)]
    struct RecordingRisk {
        seen: Mutex<Vec<String>>,
    }

    impl RiskOracle for &RecordingRisk {
        fn flag(
            &self,
            _record: &PatientRecord,
            diagnoses: &[ValidatedDiagnosis],
        ) -> Result<Vec<RiskFlag>, PipelineError> {
            let mut seen = self.seen.lock().unwrap();
            seen.extend(diagnoses.iter().map(|d| d.name.clone()));
            Ok(vec![RiskFlag {
                name: "Elevated BP".into(),
                urgency: Urgency::Medium,
                rationale: "BP 150/95".into(),
            }])
        }
    }

    struct EchoAdvisory;

    impl AdvisoryOracle for EchoAdvisory {
        fn advise(
            &self,
            _record: &PatientRecord,
            diagnoses: &[ValidatedDiagnosis],
            flags: &[RiskFlag],
        ) -> Result<Advisory, PipelineError> {
            Ok(Advisory {
                summary: format!("{} diagnoses, {} flags", diagnoses.len(), flags.len()),
                ..Default::default()
            })
        }
    }

    /// Keeps every candidate as FLAGGED and counts its calls.
    #[derive(Default)]
    struct FlagAllEngine {
        calls: Mutex<usize>,
    }

    impl RuleEngine for &FlagAllEngine {
        fn validate(
            &self,
            _record: &PatientRecord,
            candidates: &[CandidateDiagnosis],
        ) -> ValidationOutcome {
            *self.calls.lock().unwrap() += 1;
            ValidationOutcome {
                diagnoses: candidates
                    .iter()
                    .map(|c| ValidatedDiagnosis {
                        name: c.name.clone(),
                        confidence: 0.1,
                        evidence: c.evidence.clone(),
                        validation_status: ValidationStatus::Flagged,
                        rule_engine_notes: "WARNING: held for review".into(),
                    })
                    .collect(),
                rejected: Vec::new(),
            }
        }
    }

    fn raw_input() -> RawPatientInput {
        serde_json::from_str(
            r#"{"demographics": {"age": 58, "sex": "Female"},
                "vitals": "BP: 150/95, HR: 72",
                "labs": "Hemoglobin: 13.5"}"#,
        )
        .unwrap()
    }

    #[test]
    fn refuted_diagnoses_never_reach_later_stages() {
        let risk = RecordingRisk::default();
        let pipeline = ClinicalPipeline::new(
            FixedDiagnoses(
                r#"{"diagnoses": [
                    {"name": "Hypertension", "confidence": 0.9, "evidence": "BP 150/95"},
                    {"name": "Anemia", "confidence": 0.7, "evidence": "fatigue"},
                    {"name": "Tachycardia", "confidence": 0.5, "evidence": "palpitations"}
                ]}"#,
            ),
            &risk,
            EchoAdvisory,
        );

        let report = pipeline.run(&raw_input()).unwrap();

        let names: Vec<&str> = report.diagnoses.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Hypertension"]);
        assert_eq!(report.diagnoses[0].validation_status, ValidationStatus::Validated);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(*risk.seen.lock().unwrap(), vec!["Hypertension".to_string()]);
        assert_eq!(report.advisory.summary, "1 diagnoses, 1 flags");
        assert_eq!(report.flags.len(), 1);
    }

    #[test]
    fn custom_rule_engine_replaces_catalog() {
        let risk = RecordingRisk::default();
        let engine = FlagAllEngine::default();
        let pipeline = ClinicalPipeline::new(
            FixedDiagnoses(
                r#"{"diagnoses": [
                    {"name": "Anemia", "confidence": 0.7},
                    {"name": "Tachycardia", "confidence": 0.5}
                ]}"#,
            ),
            &risk,
            EchoAdvisory,
        )
        .with_rule_engine(&engine);

        let report = pipeline.run(&raw_input()).unwrap();

        assert_eq!(*engine.calls.lock().unwrap(), 1);
        assert!(report.rejected.is_empty());
        assert_eq!(report.diagnoses.len(), 2);
        assert!(report
            .diagnoses
            .iter()
            .all(|d| d.validation_status == ValidationStatus::Flagged));
        assert_eq!(
            *risk.seen.lock().unwrap(),
            vec!["Anemia".to_string(), "Tachycardia".to_string()]
        );
    }

    #[test]
    fn oracle_failure_propagates() {
        let risk = RecordingRisk::default();
        let pipeline = ClinicalPipeline::new(FailingOracle, &risk, EchoAdvisory);
        let err = pipeline.run(&raw_input()).unwrap_err();
        assert!(matches!(err, PipelineError::Oracle(_)));
        assert!(risk.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn report_serializes() {
        let risk = RecordingRisk::default();
        let pipeline = ClinicalPipeline::new(FixedDiagnoses(r#"{"diagnoses": []}"#), &risk, EchoAdvisory);
        let report = pipeline.run(&raw_input()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["run_id"].is_string());
        assert_eq!(json["diagnoses"], serde_json::json!([]));
        assert_eq!(json["record"]["vitals"], "BP: 150/95, HR: 72");
    }
}
