//! Intake normalization: raw form/transcript fields into a `PatientRecord`.
//!
//! Manual form entry is checked with [`validate_intake`] and rendered with
//! [`ManualIntake::to_raw_input`]. Text from documents or transcriptions is
//! folded in with [`merge_source`], appended under a labelled separator so the
//! manual values stay first and win in the first-match extractor.

use serde::{Deserialize, Serialize};

use crate::models::{nullable_string, PatientInfo, PatientRecord, Sex, StructuredVitals};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDemographics {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
}

/// Raw intake as produced by the form, document or speech front ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPatientInput {
    #[serde(default)]
    pub demographics: RawDemographics,
    #[serde(default, deserialize_with = "nullable_string")]
    pub free_text: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub vitals: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub labs: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub medications: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub imaging: String,
}

/// Manual form entry before any document or transcription is merged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualIntake {
    /// A PDF or URL was supplied alongside the form.
    #[serde(default)]
    pub has_document: bool,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub notes: String,
    #[serde(default)]
    pub vitals: StructuredVitals,
    #[serde(default, deserialize_with = "nullable_string")]
    pub medications: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub imaging: String,
}

impl ManualIntake {
    /// Render the form as raw intake. The vitals line is only written when all
    /// six vitals are present, e.g. `BP 120/80, HR 72, Temp 37°C, RR 16, SpO2 98%`.
    pub fn to_raw_input(&self) -> RawPatientInput {
        let v = &self.vitals;
        let vitals = match (
            v.systolic_bp,
            v.diastolic_bp,
            v.heart_rate,
            v.temperature,
            v.respiratory_rate,
            v.spo2,
        ) {
            (Some(sys), Some(dia), Some(hr), Some(temp), Some(rr), Some(spo2)) => {
                format!("BP {sys}/{dia}, HR {hr}, Temp {temp}°C, RR {rr}, SpO2 {spo2}%")
            }
            _ => String::new(),
        };

        RawPatientInput {
            demographics: RawDemographics {
                age: self.age,
                sex: self.sex,
            },
            free_text: self.notes.trim().to_string(),
            vitals,
            labs: String::new(),
            medications: self.medications.trim().to_string(),
            imaging: self.imaging.trim().to_string(),
        }
    }
}

/// Mandatory intake fields that are missing, in form order. Empty when the
/// intake is complete.
pub fn validate_intake(intake: &ManualIntake) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if !intake.has_document {
        missing.push("Document (PDF or URL)");
    }
    if intake.notes.trim().is_empty() {
        missing.push("Clinical Notes / HPI / Summary");
    }
    if intake.age.unwrap_or(0) == 0 {
        missing.push("Age");
    }
    if matches!(intake.sex, None | Some(Sex::Unknown)) {
        missing.push("Sex");
    }

    let v = &intake.vitals;
    for (value, label) in [
        (v.systolic_bp, "Systolic BP"),
        (v.diastolic_bp, "Diastolic BP"),
        (v.heart_rate, "Heart Rate"),
        (v.respiratory_rate, "Respiratory Rate"),
        (v.temperature, "Temperature"),
        (v.spo2, "SpO2"),
    ] {
        if value.is_none() {
            missing.push(label);
        }
    }

    if intake.medications.trim().is_empty() {
        missing.push("Current Medications");
    }
    if intake.imaging.trim().is_empty() {
        missing.push("Imaging Studies");
    }

    if !missing.is_empty() {
        tracing::debug!(missing = missing.len(), "Intake incomplete");
    }
    missing
}

/// Fold text extracted from another source into `base`.
///
/// Extracted demographics replace the base values when present. Each non-blank
/// extracted text field is appended after the base text under a
/// `--- FROM {label} ---` separator; blank extracted fields leave the base
/// untouched.
pub fn merge_source(
    mut base: RawPatientInput,
    extracted: &RawPatientInput,
    label: &str,
) -> RawPatientInput {
    if let Some(age) = extracted.demographics.age.filter(|a| *a > 0) {
        base.demographics.age = Some(age);
    }
    if let Some(sex) = extracted.demographics.sex.filter(|s| *s != Sex::Unknown) {
        base.demographics.sex = Some(sex);
    }

    for (target, incoming) in [
        (&mut base.free_text, &extracted.free_text),
        (&mut base.vitals, &extracted.vitals),
        (&mut base.medications, &extracted.medications),
        (&mut base.imaging, &extracted.imaging),
        (&mut base.labs, &extracted.labs),
    ] {
        append_labeled(target, incoming, label);
    }

    tracing::debug!(source = label, "Merged extracted source into intake");
    base
}

fn append_labeled(target: &mut String, incoming: &str, label: &str) {
    if incoming.trim().is_empty() {
        return;
    }
    *target = if target.trim().is_empty() {
        format!("--- FROM {label} ---\n{incoming}")
    } else {
        format!("{target}\n\n--- FROM {label} ---\n{incoming}")
    };
}

/// Build the structured record. Structured vitals are never inferred here;
/// the rule engine parses the free-text vitals and labs itself.
pub fn ingest(raw: &RawPatientInput) -> PatientRecord {
    let record = PatientRecord {
        patient: Some(PatientInfo {
            age: raw.demographics.age,
            sex: raw.demographics.sex,
            vitals: Default::default(),
        }),
        symptom_notes: raw.free_text.clone(),
        vitals: raw.vitals.clone(),
        labs: raw.labs.clone(),
        medications: raw.medications.clone(),
        imaging: raw.imaging.clone(),
    };

    tracing::debug!(
        has_vitals = !record.vitals.is_empty(),
        has_labs = !record.labs.is_empty(),
        "Structured patient record created"
    );

    record
}
