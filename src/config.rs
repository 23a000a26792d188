/// Application-level constants
pub const APP_NAME: &str = "clinical-guardrail";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Confidence ceiling when a rule cannot be checked for lack of data.
pub const MISSING_DATA_CONFIDENCE_CAP: f64 = 0.5;

/// Multiplier applied to the oracle's confidence for flagged diagnoses.
pub const FLAGGED_CONFIDENCE_FACTOR: f64 = 0.3;

/// Lower bound for flagged-diagnosis confidence.
pub const FLAGGED_CONFIDENCE_FLOOR: f64 = 0.1;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,clinical_guardrail=debug"
    } else {
        "warn,clinical_guardrail=info"
    }
}
