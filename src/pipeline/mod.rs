pub mod error;
pub mod ingestion;
pub mod oracle;
pub mod orchestrator;
pub mod rules;

pub use error::PipelineError;
