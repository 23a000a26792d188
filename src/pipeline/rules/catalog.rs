//! Rule catalog: the ordered table of condition rules.
//!
//! A diagnosis name is lower-cased and tested against each rule's keywords in
//! table order; the first rule with a keyword contained in the name applies.
//! The table is immutable and shared process-wide.

use super::measurements::{Measurement, MeasurementMap};

/// Numeric comparison against a clinical limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    GreaterThan,
    AtLeast,
}

impl Comparison {
    /// Whether `value` crosses `limit`. Equality only counts for `AtLeast`.
    pub fn holds(self, value: f64, limit: f64) -> bool {
        match self {
            Self::LessThan => value < limit,
            Self::GreaterThan => value > limit,
            Self::AtLeast => value >= limit,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::AtLeast => "≥",
        }
    }
}

/// One measurement compared against one limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub measurement: Measurement,
    pub comparison: Comparison,
    pub limit: f64,
}

impl Threshold {
    pub const fn new(measurement: Measurement, comparison: Comparison, limit: f64) -> Self {
        Self {
            measurement,
            comparison,
            limit,
        }
    }

    pub fn is_crossed(&self, value: f64) -> bool {
        self.comparison.holds(value, self.limit)
    }

    /// e.g. `Systolic BP 150 ≥ 140 mmHg`.
    pub fn describe_with(&self, value: f64) -> String {
        let limit = self.measurement.format_value(self.limit);
        format!(
            "{} {} {} {}",
            self.measurement.label(),
            value,
            self.comparison.symbol(),
            limit
        )
    }
}

/// Which measurements a rule needs, and how their thresholds combine.
///
/// In both shapes the criterion is positive when any threshold is crossed.
/// They differ in what counts as missing data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Requirement {
    /// Every listed measurement must be present.
    AllRequired(&'static [Threshold]),
    /// Alternatives in priority order; missing only when all are absent.
    AnyOf(&'static [Threshold]),
}

impl Requirement {
    pub fn thresholds(&self) -> &'static [Threshold] {
        match self {
            Self::AllRequired(t) | Self::AnyOf(t) => t,
        }
    }
}

/// A named clinical condition with its decision rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionRule {
    /// Stable identifier, e.g. `kidney_disease`.
    pub key: &'static str,
    /// Substrings that select this rule (lower-case).
    pub keywords: &'static [&'static str],
    /// Human name used in verdict text.
    pub condition: &'static str,
    /// Human-readable positive criterion.
    pub criteria: &'static str,
    pub requirement: Requirement,
}

/// A measurement value read while evaluating a rule. `None` when absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub measurement: Measurement,
    pub value: Option<f64>,
}

impl Reading {
    pub fn describe(&self) -> String {
        match self.value {
            Some(v) => format!("{} {}", self.measurement.label(), self.measurement.format_value(v)),
            None => format!("{} N/A", self.measurement.label()),
        }
    }
}

/// Result of applying one rule to a measurement map.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEvaluation {
    /// Required data absent. Cannot confirm or refute.
    Missing { absent: Vec<Measurement> },
    /// A threshold was crossed.
    Positive {
        threshold: Threshold,
        value: f64,
        readings: Vec<Reading>,
    },
    /// Data present, no threshold crossed.
    Negative { readings: Vec<Reading> },
}

impl ConditionRule {
    pub fn matches(&self, lowered_name: &str) -> bool {
        self.keywords.iter().any(|k| lowered_name.contains(k))
    }

    /// Evaluate the rule. Thresholds are tried in table order, so for `AnyOf`
    /// the first present alternative that crosses its limit is cited.
    pub fn evaluate(&self, measurements: &MeasurementMap) -> RuleEvaluation {
        let thresholds = self.requirement.thresholds();
        let readings: Vec<Reading> = thresholds
            .iter()
            .map(|t| Reading {
                measurement: t.measurement,
                value: measurements.get(t.measurement),
            })
            .collect();

        let absent: Vec<Measurement> = readings
            .iter()
            .filter(|r| r.value.is_none())
            .map(|r| r.measurement)
            .collect();

        let missing = match self.requirement {
            Requirement::AllRequired(_) => !absent.is_empty(),
            Requirement::AnyOf(_) => absent.len() == thresholds.len(),
        };
        if missing {
            return RuleEvaluation::Missing { absent };
        }

        let crossed = thresholds
            .iter()
            .zip(&readings)
            .find_map(|(t, r)| r.value.filter(|v| t.is_crossed(*v)).map(|v| (*t, v)));

        match crossed {
            Some((threshold, value)) => RuleEvaluation::Positive {
                threshold,
                value,
                readings,
            },
            None => RuleEvaluation::Negative { readings },
        }
    }
}

const HYPERTENSION: &[Threshold] = &[
    Threshold::new(Measurement::SystolicBp, Comparison::AtLeast, 140.0),
    Threshold::new(Measurement::DiastolicBp, Comparison::AtLeast, 90.0),
];
const HYPOTENSION: &[Threshold] = &[Threshold::new(
    Measurement::SystolicBp,
    Comparison::LessThan,
    90.0,
)];
const TACHYCARDIA: &[Threshold] = &[Threshold::new(
    Measurement::HeartRate,
    Comparison::GreaterThan,
    100.0,
)];
const BRADYCARDIA: &[Threshold] = &[Threshold::new(
    Measurement::HeartRate,
    Comparison::LessThan,
    60.0,
)];
const DIABETES: &[Threshold] = &[
    Threshold::new(Measurement::Glucose, Comparison::AtLeast, 126.0),
    Threshold::new(Measurement::Hba1c, Comparison::AtLeast, 6.5),
];
const ANEMIA: &[Threshold] = &[Threshold::new(
    Measurement::Hemoglobin,
    Comparison::LessThan,
    12.0,
)];
const KIDNEY_DISEASE: &[Threshold] = &[Threshold::new(
    Measurement::Creatinine,
    Comparison::GreaterThan,
    1.3,
)];

/// The catalog, in match priority order.
static RULES: [ConditionRule; 7] = [
    ConditionRule {
        key: "hypertension",
        keywords: &["hypertension"],
        condition: "hypertension",
        criteria: "SBP ≥ 140 OR DBP ≥ 90",
        requirement: Requirement::AllRequired(HYPERTENSION),
    },
    ConditionRule {
        key: "hypotension",
        keywords: &["hypotension"],
        condition: "hypotension",
        criteria: "SBP < 90",
        requirement: Requirement::AllRequired(HYPOTENSION),
    },
    ConditionRule {
        key: "tachycardia",
        keywords: &["tachycardia"],
        condition: "tachycardia",
        criteria: "HR > 100 bpm",
        requirement: Requirement::AllRequired(TACHYCARDIA),
    },
    ConditionRule {
        key: "bradycardia",
        keywords: &["bradycardia"],
        condition: "bradycardia",
        criteria: "HR < 60 bpm",
        requirement: Requirement::AllRequired(BRADYCARDIA),
    },
    ConditionRule {
        key: "diabetes",
        keywords: &["diabetes", "diabetic"],
        condition: "diabetes",
        criteria: "Glucose ≥ 126 mg/dL OR HbA1c ≥ 6.5%",
        requirement: Requirement::AnyOf(DIABETES),
    },
    ConditionRule {
        key: "anemia",
        keywords: &["anemia"],
        condition: "anemia",
        criteria: "Hemoglobin < 12 g/dL",
        requirement: Requirement::AllRequired(ANEMIA),
    },
    ConditionRule {
        key: "kidney_disease",
        keywords: &["kidney", "renal"],
        condition: "kidney disease",
        criteria: "Creatinine > 1.3 mg/dL",
        requirement: Requirement::AllRequired(KIDNEY_DISEASE),
    },
];

/// All rules in priority order.
pub fn rules() -> &'static [ConditionRule] {
    &RULES
}

/// First rule whose keyword appears in the (case-insensitive) diagnosis name.
pub fn match_rule(diagnosis_name: &str) -> Option<&'static ConditionRule> {
    let lowered = diagnosis_name.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&lowered))
}
