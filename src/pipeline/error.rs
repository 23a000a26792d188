use thiserror::Error;

/// Errors from the pipeline stages around the rule engine.
///
/// The rule engine itself never fails: missing data and refuted diagnoses are
/// verdicts, not errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Reasoning oracle error: {0}")]
    Oracle(String),

    #[error("Oracle response parsing failed: {0}")]
    ResponseParse(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        Self::ResponseParse(e.to_string())
    }
}
