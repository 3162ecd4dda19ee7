//! Fund join-request model.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A join-request row from the `fund_join_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundJoinRequest {
    pub id: DbId,
    pub fund_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Join request joined with the requester's profile, for review listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JoinRequestWithUser {
    pub id: DbId,
    pub fund_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub display_name: String,
    pub email: String,
    pub created_at: Timestamp,
}
