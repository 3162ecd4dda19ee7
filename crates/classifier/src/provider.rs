//! The provider abstraction the ingestion pipeline talks to.

use async_trait::async_trait;
use sqlx::PgPool;

use fundmate_core::category::CategoryOption;
use fundmate_core::message::Extraction;
use fundmate_core::types::DbId;

use crate::error::ClassifierError;

/// One classification request: the free text plus the category options the
/// model may pick from, already sorted custom-before-default.
///
/// `fund_id` / `message_id` are only carried into the audit log.
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub fund_id: Option<DbId>,
    pub message_id: Option<DbId>,
    pub text: String,
    pub categories: Vec<CategoryOption>,
}

/// A classifier provider.
///
/// Implementations must write a `classifier_logs` row for every invocation,
/// success or failure, which is why the pool is part of the signature.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Model identifier recorded in the audit log.
    fn model_name(&self) -> &str;

    /// Extract structured transaction data from free text.
    async fn classify(
        &self,
        pool: &PgPool,
        request: &ClassifyRequest,
    ) -> Result<Extraction, ClassifierError>;
}
