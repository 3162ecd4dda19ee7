//! External classifier clients.
//!
//! Turns a message's free text into a structured [`Extraction`] via a
//! Gemini-shaped REST provider, with a deterministic mock for tests and
//! offline deployments. Every invocation, success or failure, is recorded
//! in the `classifier_logs` audit table.
//!
//! [`Extraction`]: fundmate_core::message::Extraction

use std::sync::Arc;

pub mod error;
pub mod gemini;
pub mod mock;
pub mod payload;
pub mod prompt;
pub mod provider;

use crate::error::ClassifierError;
use crate::gemini::{GeminiClassifier, GeminiConfig};
use crate::mock::MockClassifier;
use crate::provider::Classifier;

/// Build the configured provider from `CLASSIFIER_*` environment variables.
///
/// `CLASSIFIER_PROVIDER` selects `gemini` (default) or `mock`; any other
/// value is rejected rather than falling back.
pub fn from_env() -> Result<Arc<dyn Classifier>, ClassifierError> {
    let provider = std::env::var("CLASSIFIER_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
    match provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClassifier::new(GeminiConfig::from_env())?)),
        "mock" => Ok(Arc::new(MockClassifier::new())),
        other => Err(ClassifierError::NotConfigured(format!(
            "Unknown classifier provider '{other}'"
        ))),
    }
}
