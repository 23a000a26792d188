//! Measurement vocabulary and the vitals/labs extractor.
//!
//! Structured vitals are applied first, then values parsed from the free-text
//! vitals and labs strings. Text-derived values win on conflict. A measurement
//! that neither path produced is absent from the map: absence is the only
//! "unknown" signal, there is never a zero or placeholder entry.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{PatientRecord, StructuredVitals};

/// A named clinical measurement (vital sign or lab result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    SystolicBp,
    DiastolicBp,
    HeartRate,
    RespiratoryRate,
    Temperature,
    Spo2,
    Glucose,
    Hba1c,
    Hemoglobin,
    Creatinine,
}

impl Measurement {
    /// Display label used in verdict text.
    pub fn label(self) -> &'static str {
        match self {
            Self::SystolicBp => "Systolic BP",
            Self::DiastolicBp => "Diastolic BP",
            Self::HeartRate => "HR",
            Self::RespiratoryRate => "Respiratory rate",
            Self::Temperature => "Temperature",
            Self::Spo2 => "SpO2",
            Self::Glucose => "Glucose",
            Self::Hba1c => "HbA1c",
            Self::Hemoglobin => "Hemoglobin",
            Self::Creatinine => "Creatinine",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::SystolicBp | Self::DiastolicBp => "mmHg",
            Self::HeartRate => "bpm",
            Self::RespiratoryRate => "breaths/min",
            Self::Temperature => "°C",
            Self::Spo2 | Self::Hba1c => "%",
            Self::Glucose | Self::Creatinine => "mg/dL",
            Self::Hemoglobin => "g/dL",
        }
    }

    /// Format a value with its unit, e.g. `130 mg/dL`, `6.9%`.
    pub fn format_value(self, value: f64) -> String {
        match self.unit() {
            "%" => format!("{value}%"),
            unit => format!("{value} {unit}"),
        }
    }
}

/// Numeric measurements extracted from one patient record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementMap(BTreeMap<Measurement, f64>);

impl MeasurementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        self.0.get(&measurement).copied()
    }

    pub fn contains(&self, measurement: Measurement) -> bool {
        self.0.contains_key(&measurement)
    }

    /// Set a value, replacing any earlier one. Non-finite values are ignored.
    pub fn insert(&mut self, measurement: Measurement, value: f64) {
        if value.is_finite() {
            self.0.insert(measurement, value);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }
}

impl FromIterator<(Measurement, f64)> for MeasurementMap {
    fn from_iter<I: IntoIterator<Item = (Measurement, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (m, v) in iter {
            map.insert(m, v);
        }
        map
    }
}

// Patterns mirror how vitals and labs are typed on intake forms: label, optional
// colon, optional whitespace, number. Case-insensitive.
static RE_BP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)BP:?\s*(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)").unwrap());
static RE_HR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HR:?\s*(\d+(?:\.\d+)?)").unwrap());
static RE_TEMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Temp:?\s*(\d+\.?\d*)").unwrap());
static RE_SPO2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SpO2:?\s*(\d+(?:\.\d+)?)").unwrap());

static RE_GLUCOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Glucose:?\s*(\d+\.?\d*)").unwrap());
static RE_HEMOGLOBIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Hemoglobin:?\s*(\d+\.?\d*)").unwrap());
static RE_CREATININE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Creatinine:?\s*(\d+\.?\d*)").unwrap());
static RE_HBA1C: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HbA1c:?\s*(\d+\.?\d*)").unwrap());

/// Capture group `group` of the first match, parsed as f64.
fn capture_f64(re: &Regex, text: &str, group: usize) -> Option<f64> {
    re.captures(text)?.get(group)?.as_str().parse::<f64>().ok()
}

/// Parse vital signs from free text. Only the first match per pattern counts.
pub fn parse_vitals_text(text: &str) -> MeasurementMap {
    let mut vitals = MeasurementMap::new();

    if let Some(caps) = RE_BP.captures(text) {
        let systolic = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        let diastolic = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
        if let (Some(sys), Some(dia)) = (systolic, diastolic) {
            vitals.insert(Measurement::SystolicBp, sys);
            vitals.insert(Measurement::DiastolicBp, dia);
        }
    }
    if let Some(hr) = capture_f64(&RE_HR, text, 1) {
        vitals.insert(Measurement::HeartRate, hr);
    }
    if let Some(temp) = capture_f64(&RE_TEMP, text, 1) {
        vitals.insert(Measurement::Temperature, temp);
    }
    if let Some(spo2) = capture_f64(&RE_SPO2, text, 1) {
        vitals.insert(Measurement::Spo2, spo2);
    }

    vitals
}

/// Parse lab values from free text.
pub fn parse_labs_text(text: &str) -> MeasurementMap {
    [
        (&*RE_GLUCOSE, Measurement::Glucose),
        (&*RE_HEMOGLOBIN, Measurement::Hemoglobin),
        (&*RE_CREATININE, Measurement::Creatinine),
        (&*RE_HBA1C, Measurement::Hba1c),
    ]
    .into_iter()
    .filter_map(|(re, m)| capture_f64(re, text, 1).map(|v| (m, v)))
    .collect()
}

fn structured_measurements(vitals: &StructuredVitals) -> MeasurementMap {
    [
        (Measurement::SystolicBp, vitals.systolic_bp),
        (Measurement::DiastolicBp, vitals.diastolic_bp),
        (Measurement::HeartRate, vitals.heart_rate),
        (Measurement::RespiratoryRate, vitals.respiratory_rate),
        (Measurement::Temperature, vitals.temperature),
        (Measurement::Spo2, vitals.spo2),
    ]
    .into_iter()
    .filter_map(|(m, v)| v.map(|v| (m, v)))
    .collect()
}

/// Build the measurement map for a record.
///
/// Order matters: structured vitals first, then text-parsed vitals (overwrite),
/// then text-parsed labs.
pub fn extract_measurements(record: &PatientRecord) -> MeasurementMap {
    let mut map = record
        .structured_vitals()
        .map(structured_measurements)
        .unwrap_or_default();

    if !record.vitals.trim().is_empty() {
        for (m, v) in parse_vitals_text(&record.vitals).iter() {
            map.insert(m, v);
        }
    }
    if !record.labs.trim().is_empty() {
        for (m, v) in parse_labs_text(&record.labs).iter() {
            map.insert(m, v);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientInfo;

    fn record(vitals: &str, labs: &str) -> PatientRecord {
        PatientRecord {
            vitals: vitals.into(),
            labs: labs.into(),
            ..Default::default()
        }
    }

    #[test]
    fn vitals_text_bp_and_hr() {
        let map = extract_measurements(&record("BP: 150/95, HR: 110", ""));
        assert_eq!(map.get(Measurement::SystolicBp), Some(150.0));
        assert_eq!(map.get(Measurement::DiastolicBp), Some(95.0));
        assert_eq!(map.get(Measurement::HeartRate), Some(110.0));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn vitals_text_case_insensitive_optional_colon() {
        let map = parse_vitals_text("bp 128/82 hr 64 temp 37.2 spo2 97");
        assert_eq!(map.get(Measurement::SystolicBp), Some(128.0));
        assert_eq!(map.get(Measurement::DiastolicBp), Some(82.0));
        assert_eq!(map.get(Measurement::HeartRate), Some(64.0));
        assert_eq!(map.get(Measurement::Temperature), Some(37.2));
        assert_eq!(map.get(Measurement::Spo2), Some(97.0));
    }

    #[test]
    fn labs_text_all_four() {
        let map = parse_labs_text("Glucose: 141 mg/dL; Hemoglobin: 11.2; Creatinine 1.6; HbA1c: 7.1%");
        assert_eq!(map.get(Measurement::Glucose), Some(141.0));
        assert_eq!(map.get(Measurement::Hemoglobin), Some(11.2));
        assert_eq!(map.get(Measurement::Creatinine), Some(1.6));
        assert_eq!(map.get(Measurement::Hba1c), Some(7.1));
    }

    #[test]
    fn first_match_wins_within_text() {
        let map = parse_vitals_text("HR: 88 (repeat HR: 120)");
        assert_eq!(map.get(Measurement::HeartRate), Some(88.0));
    }

    #[test]
    fn text_overrides_structured() {
        let rec = PatientRecord {
            patient: Some(PatientInfo {
                vitals: StructuredVitals {
                    systolic_bp: Some(110.0),
                    diastolic_bp: Some(70.0),
                    respiratory_rate: Some(16.0),
                    ..Default::default()
                },
                ..Default::default()
            }),
            vitals: "BP: 160/100".into(),
            ..Default::default()
        };
        let map = extract_measurements(&rec);
        assert_eq!(map.get(Measurement::SystolicBp), Some(160.0));
        assert_eq!(map.get(Measurement::DiastolicBp), Some(100.0));
        assert_eq!(map.get(Measurement::RespiratoryRate), Some(16.0));
    }

    #[test]
    fn structured_kept_when_text_silent() {
        let rec = PatientRecord {
            patient: Some(PatientInfo {
                vitals: StructuredVitals {
                    heart_rate: Some(52.0),
                    ..Default::default()
                },
                ..Default::default()
            }),
            vitals: "Temp: 37.8°C".into(),
            ..Default::default()
        };
        let map = extract_measurements(&rec);
        assert_eq!(map.get(Measurement::HeartRate), Some(52.0));
        assert_eq!(map.get(Measurement::Temperature), Some(37.8));
    }

    #[test]
    fn missing_values_are_absent() {
        let map = extract_measurements(&record("patient comfortable", "pending"));
        assert!(map.is_empty());
        assert!(!map.contains(Measurement::Hemoglobin));
    }

    #[test]
    fn labs_not_read_from_vitals_text() {
        let map = extract_measurements(&record("Glucose: 200", ""));
        assert_eq!(map.get(Measurement::Glucose), None);
    }

    #[test]
    fn non_finite_values_rejected() {
        let mut map = MeasurementMap::new();
        map.insert(Measurement::Glucose, f64::NAN);
        map.insert(Measurement::Creatinine, f64::INFINITY);
        assert!(map.is_empty());
    }

    #[test]
    fn map_serializes_with_snake_keys() {
        let map = parse_vitals_text("BP: 120/80");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["systolic_bp"], 120.0);
        assert_eq!(json["diastolic_bp"], 80.0);
    }

    #[test]
    fn format_value_units() {
        assert_eq!(Measurement::Glucose.format_value(130.0), "130 mg/dL");
        assert_eq!(Measurement::Hba1c.format_value(6.9), "6.9%");
        assert_eq!(Measurement::HeartRate.format_value(110.0), "110 bpm");
        assert_eq!(Measurement::Temperature.format_value(37.8), "37.8 °C");
    }
}
