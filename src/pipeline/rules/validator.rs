//! Diagnosis validator: one candidate name against one measurement map.
//!
//! Outcomes:
//! - no rule matches → INFO, valid, pass-through (not an endorsement)
//! - required data missing → WARNING, invalid, capped at 0.5
//! - threshold crossed → INFO, valid, cap 1.0
//! - data present but normal → CRITICAL, invalid, cap 0.0

use crate::config::MISSING_DATA_CONFIDENCE_CAP;
use crate::models::Severity;

use super::catalog::{match_rule, ConditionRule, Reading, Requirement, RuleEvaluation};
use super::measurements::{Measurement, MeasurementMap};
use super::types::ValidationVerdict;

/// Validate one diagnosis name against the extracted measurements.
///
/// The candidate's evidence text is carried through by the batch runner and is
/// never consulted here: verdicts depend on measured values only.
pub fn validate_diagnosis(diagnosis_name: &str, measurements: &MeasurementMap) -> ValidationVerdict {
    match match_rule(diagnosis_name) {
        Some(rule) => apply_rule(rule, measurements),
        None => ValidationVerdict {
            is_valid: true,
            max_confidence: 1.0,
            severity: Severity::Info,
            reason: "No specific validation rule available".to_string(),
            notes: "Diagnosis not validated by clinical rules engine".to_string(),
            rule_key: None,
        },
    }
}

/// Apply a specific catalog rule.
pub fn apply_rule(rule: &ConditionRule, measurements: &MeasurementMap) -> ValidationVerdict {
    match rule.evaluate(measurements) {
        RuleEvaluation::Missing { absent } => missing_verdict(rule, &absent),
        RuleEvaluation::Positive {
            threshold,
            value,
            readings,
        } => ValidationVerdict {
            is_valid: true,
            max_confidence: 1.0,
            severity: Severity::Info,
            reason: format!(
                "{} meets {} criteria",
                join_readings(&readings),
                rule.condition
            ),
            notes: format!("Validated: {}", threshold.describe_with(value)),
            rule_key: Some(rule.key),
        },
        RuleEvaluation::Negative { readings } => ValidationVerdict {
            is_valid: false,
            max_confidence: 0.0,
            severity: Severity::Critical,
            reason: format!(
                "{} is NORMAL (does not meet {} criteria: {})",
                join_readings(&readings),
                rule.condition,
                rule.criteria
            ),
            notes: format!(
                "INVALID: {} does not meet {} criteria ({})",
                join_readings(&readings),
                rule.condition,
                rule.criteria
            ),
            rule_key: Some(rule.key),
        },
    }
}

fn missing_verdict(rule: &ConditionRule, absent: &[Measurement]) -> ValidationVerdict {
    let (joiner, reason) = match rule.requirement {
        Requirement::AllRequired(_) => {
            let labels = join_labels(absent, " and ");
            (
                " and ",
                format!("{labels} not available for {} diagnosis", rule.condition),
            )
        }
        Requirement::AnyOf(_) => {
            let labels = join_labels(absent, " or ");
            (" or ", format!("No {labels} values available"))
        }
    };
    let needed: Vec<Measurement> = rule
        .requirement
        .thresholds()
        .iter()
        .map(|t| t.measurement)
        .collect();

    ValidationVerdict {
        is_valid: false,
        max_confidence: MISSING_DATA_CONFIDENCE_CAP,
        severity: Severity::Warning,
        reason,
        notes: format!(
            "Cannot validate {} without {}",
            rule.condition,
            join_labels(&needed, joiner)
        ),
        rule_key: Some(rule.key),
    }
}

fn join_labels(measurements: &[Measurement], sep: &str) -> String {
    measurements
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(sep)
}

fn join_readings(readings: &[Reading]) -> String {
    readings
        .iter()
        .map(Reading::describe)
        .collect::<Vec<_>>()
        .join(", ")
}
