//! Message entity model and DTOs.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full message row from the `messages` table.
///
/// `body` is the user's raw text; the classifier fills the parsed fields
/// and flips `status`. `transaction_id` closes the bidirectional link with
/// the materialized transaction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub fund_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub body: String,
    pub spend_value: Option<f64>,
    pub earn_value: Option<f64>,
    pub content: Option<String>,
    pub category_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
    pub processed_at: Option<Timestamp>,
    pub failure_reason: Option<String>,
    pub transaction_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new message in its initial state.
#[derive(Debug)]
pub struct CreateMessage {
    pub fund_id: DbId,
    pub user_id: DbId,
    pub body: String,
}
