//! Ingestion pipeline errors.

use fundmate_classifier::error::ClassifierError;
use fundmate_core::types::DbId;
use thiserror::Error;

/// Errors surfaced by the ingestion pipeline.
///
/// Classifier errors stay distinguishable from infrastructure errors so
/// callers can choose between retrying (worker) and degrading to a FAILED
/// message (synchronous mode).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Message {0} not found")]
    MessageNotFound(DbId),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
