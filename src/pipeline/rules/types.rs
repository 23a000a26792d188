use serde::{Deserialize, Serialize};

use crate::models::{Severity, ValidatedDiagnosis};

/// The rule engine's judgement on one diagnosis. Produced and consumed inside
/// a single batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    /// Ceiling applied to the oracle's confidence when the diagnosis is kept.
    pub max_confidence: f64,
    pub severity: Severity,
    pub reason: String,
    pub notes: String,
    /// Catalog key of the rule applied, `None` on pass-through.
    pub rule_key: Option<&'static str>,
}

/// A candidate the rule engine refuted and removed from the output.
/// Only reported through the audit side channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedDiagnosis {
    pub name: String,
    pub original_confidence: f64,
    pub rule_key: String,
    pub reason: String,
    pub notes: String,
}

/// Result of a batch run with the audit trail attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Kept diagnoses, in input order.
    pub diagnoses: Vec<ValidatedDiagnosis>,
    /// Refuted diagnoses, in input order.
    pub rejected: Vec<RejectedDiagnosis>,
}

/// Per-batch counts for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationCounts {
    pub validated: usize,
    pub flagged: usize,
    pub rejected: usize,
    pub unruled: usize,
}

impl ValidationCounts {
    pub fn total(&self) -> usize {
        self.validated + self.flagged + self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_total_excludes_unruled_overlap() {
        let counts = ValidationCounts {
            validated: 2,
            flagged: 1,
            rejected: 1,
            unruled: 1,
        };
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn rejected_serializes() {
        let r = RejectedDiagnosis {
            name: "Hypertension".into(),
            original_confidence: 0.8,
            rule_key: "hypertension".into(),
            reason: "normal".into(),
            notes: "INVALID".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["rule_key"], "hypertension");
        assert_eq!(json["original_confidence"], 0.8);
    }
}
