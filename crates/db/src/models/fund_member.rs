//! Fund membership model.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A membership row from the `fund_members` table.
///
/// The (fund_id, user_id) pair is unique across soft deletes; removed
/// members are reactivated in place when they rejoin.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundMember {
    pub id: DbId,
    pub fund_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Membership joined with the member's profile, for listing endpoints.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundMemberWithUser {
    pub id: DbId,
    pub fund_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub display_name: String,
    pub email: String,
    pub created_at: Timestamp,
}
