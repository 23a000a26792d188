//! Clinical rule validation engine.
//!
//! Deterministic guardrail between the diagnosis oracle and reporting:
//! extracts numeric measurements from the patient record and checks every
//! proposed diagnosis against a fixed catalog of clinical thresholds.

pub mod catalog;
pub mod engine;
pub mod measurements;
pub mod types;
pub mod validator;

pub use catalog::{match_rule, rules, ConditionRule, Requirement};
pub use engine::{
    validate_against, validate_diagnoses, validate_diagnoses_with_audit, DefaultRuleEngine,
    RuleEngine,
};
pub use measurements::{extract_measurements, Measurement, MeasurementMap};
pub use types::{RejectedDiagnosis, ValidationOutcome, ValidationVerdict};
pub use validator::validate_diagnosis;
