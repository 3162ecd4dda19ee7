//! Classifier invocation audit log model.

use fundmate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One classifier call: request, response or error, and latency. Written
/// for every invocation, success or failure.
#[derive(Debug, Clone, FromRow)]
pub struct ClassifierLog {
    pub id: DbId,
    pub model: String,
    pub request: serde_json::Value,
    pub response: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub latency_ms: i64,
    pub fund_id: Option<DbId>,
    pub message_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a classifier call.
#[derive(Debug)]
pub struct CreateClassifierLog {
    pub model: String,
    pub request: serde_json::Value,
    pub response: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub latency_ms: i64,
    pub fund_id: Option<DbId>,
    pub message_id: Option<DbId>,
}
