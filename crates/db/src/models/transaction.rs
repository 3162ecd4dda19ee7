//! Transaction entity model and DTOs.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full transaction row from the `transactions` table.
///
/// Materialized from a processed message; `raw_prompt` preserves the text
/// the amounts were extracted from.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub fund_id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub message_id: Option<DbId>,
    pub status: String,
    pub raw_prompt: String,
    pub spend_value: Option<f64>,
    pub earn_value: Option<f64>,
    pub content: String,
    pub category_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
    pub occurred_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for materializing a transaction from an extraction.
///
/// `occurred_at` is pinned to the source message's creation time so the
/// spending timeline follows when the user said it, not when the classifier
/// got around to it.
#[derive(Debug)]
pub struct CreateTransaction {
    pub fund_id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub message_id: Option<DbId>,
    pub raw_prompt: String,
    pub spend_value: Option<f64>,
    pub earn_value: Option<f64>,
    pub content: String,
    pub category_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
    pub occurred_at: Timestamp,
}
