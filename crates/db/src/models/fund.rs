//! Fund entity model and DTOs.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full fund row from the `funds` table.
///
/// `last_message_id` / `last_message_at` are a denormalized pointer to the
/// newest non-deleted message, refreshed by the repository after every
/// message create or delete.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fund {
    pub id: DbId,
    pub name: String,
    pub fund_type: String,
    pub owner_id: DbId,
    pub share_code: Option<String>,
    pub description: Option<String>,
    pub last_message_id: Option<DbId>,
    pub last_message_at: Option<Timestamp>,
    pub open_dialog: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A fund plus its freshly computed activity key, as returned by the
/// listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FundWithActivity {
    #[serde(flatten)]
    pub fund: Fund,
    pub last_activity_at: Timestamp,
}

/// Public projection for share-code lookup: enough to decide whether to
/// request access, nothing about the membership.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicFundInfo {
    pub id: DbId,
    pub name: String,
    pub fund_type: String,
    pub share_code: Option<String>,
    pub description: Option<String>,
    pub owner_name: String,
    pub member_count: i64,
}

/// DTO for creating a new fund row. The share code is allocated by the
/// caller before insert.
#[derive(Debug)]
pub struct CreateFund {
    pub name: String,
    pub fund_type: String,
    pub owner_id: DbId,
    pub share_code: String,
    pub description: Option<String>,
    pub open_dialog: bool,
}

/// DTO for updating a fund. All fields are optional.
#[derive(Debug, Default)]
pub struct UpdateFund {
    pub name: Option<String>,
    pub description: Option<String>,
    pub open_dialog: Option<bool>,
}
