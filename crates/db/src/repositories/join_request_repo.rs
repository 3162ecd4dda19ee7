//! Repository for the `fund_join_requests` table.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::join_request::{FundJoinRequest, JoinRequestWithUser};

const COLUMNS: &str = "\
    id, fund_id, user_id, status, reviewed_by, reviewed_at, \
    deleted_at, created_at, updated_at";

/// Provides join-request operations for the approval workflow.
pub struct JoinRequestRepo;

impl JoinRequestRepo {
    /// Insert a new pending request.
    ///
    /// A second pending request for the same (fund, user) pair violates
    /// `uq_fund_join_requests_pending`; callers check for an existing
    /// pending row first and return it instead of inserting.
    pub async fn create(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
    ) -> Result<FundJoinRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO fund_join_requests (fund_id, user_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundJoinRequest>(&query)
            .bind(fund_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a request by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FundJoinRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fund_join_requests WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, FundJoinRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the pending request for a (fund, user) pair, if any.
    ///
    /// At most one exists thanks to the partial unique index.
    pub async fn find_pending(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
    ) -> Result<Option<FundJoinRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fund_join_requests
             WHERE fund_id = $1 AND user_id = $2 AND status = 'pending'
               AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, FundJoinRequest>(&query)
            .bind(fund_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the most recent approved request for a (fund, user) pair.
    ///
    /// Used to repair memberships: an approved request with no surviving
    /// member row means the user was removed after approval and may simply
    /// be re-added.
    pub async fn find_latest_approved(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
    ) -> Result<Option<FundJoinRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fund_join_requests
             WHERE fund_id = $1 AND user_id = $2 AND status = 'approved'
               AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, FundJoinRequest>(&query)
            .bind(fund_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a fund's requests with requester details, pending first, newest
    /// within each group.
    pub async fn list_by_fund(
        pool: &PgPool,
        fund_id: DbId,
    ) -> Result<Vec<JoinRequestWithUser>, sqlx::Error> {
        sqlx::query_as::<_, JoinRequestWithUser>(
            "SELECT r.id, r.fund_id, r.user_id, r.status,
                    u.display_name, u.email, r.created_at
             FROM fund_join_requests r
             JOIN users u ON u.id = r.user_id
             WHERE r.fund_id = $1 AND r.deleted_at IS NULL
             ORDER BY (r.status = 'pending') DESC, r.created_at DESC, r.id DESC",
        )
        .bind(fund_id)
        .fetch_all(pool)
        .await
    }

    /// Move a pending request to a terminal status, stamping the reviewer.
    ///
    /// The `status = 'pending'` guard makes the transition atomic: a
    /// request can only ever be decided once, even under concurrent review.
    /// Returns `None` when the row is missing or no longer pending; callers
    /// refetch to distinguish the two.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        status: &str,
        reviewed_by: DbId,
    ) -> Result<Option<FundJoinRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE fund_join_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW()
             WHERE id = $1 AND status = 'pending' AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundJoinRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reviewed_by)
            .fetch_optional(pool)
            .await
    }
}
