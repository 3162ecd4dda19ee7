//! Fund-to-category subscription model.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A subscription row from the `fund_categories` table.
///
/// Unsubscribing flips `is_active` instead of deleting, so resubscription
/// reactivates the same row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundCategory {
    pub id: DbId,
    pub fund_id: DbId,
    pub category_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
