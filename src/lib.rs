//! Clinical decision-support guardrail.
//!
//! Diagnoses proposed by a probabilistic reasoning stage are cross-checked
//! against hard numeric clinical thresholds extracted from the patient record.
//! See [`pipeline::rules`] for the rule engine and [`pipeline::orchestrator`]
//! for the end-to-end flow.

pub mod config;
pub mod models;
pub mod pipeline;

pub use pipeline::rules::{validate_diagnoses, validate_diagnoses_with_audit};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
