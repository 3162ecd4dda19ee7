//! Repository for the `fund_members` table.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::fund_member::{FundMember, FundMemberWithUser};

const COLUMNS: &str = "id, fund_id, user_id, role, deleted_at, created_at, updated_at";

/// Provides membership operations scoped to a fund.
pub struct FundMemberRepo;

impl FundMemberRepo {
    /// Find the active membership row for a (fund, user) pair.
    pub async fn find(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
    ) -> Result<Option<FundMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fund_members
             WHERE fund_id = $1 AND user_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, FundMember>(&query)
            .bind(fund_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Add a user to a fund, reviving a previously removed membership if one
    /// exists.
    ///
    /// `uq_fund_members_fund_user` spans soft-deleted rows, so re-adding a
    /// removed member must update in place rather than insert. The revived
    /// row takes the newly assigned role.
    pub async fn upsert_active(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<FundMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO fund_members (fund_id, user_id, role)
             VALUES ($1, $2, $3)
             ON CONFLICT (fund_id, user_id)
             DO UPDATE SET deleted_at = NULL, role = EXCLUDED.role
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundMember>(&query)
            .bind(fund_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// List the active members of a fund with their user details, owner
    /// first, then by join date.
    pub async fn list_by_fund(
        pool: &PgPool,
        fund_id: DbId,
    ) -> Result<Vec<FundMemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, FundMemberWithUser>(
            "SELECT fm.id, fm.fund_id, fm.user_id, fm.role,
                    u.display_name, u.email, fm.created_at
             FROM fund_members fm
             JOIN users u ON u.id = fm.user_id
             WHERE fm.fund_id = $1 AND fm.deleted_at IS NULL
             ORDER BY (fm.role = 'owner') DESC, fm.created_at ASC, fm.id ASC",
        )
        .bind(fund_id)
        .fetch_all(pool)
        .await
    }

    /// Change a member's role. Returns `true` if an active row was updated.
    pub async fn update_role(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fund_members SET role = $3
             WHERE fund_id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(fund_id)
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-remove a member from a fund. Returns `true` if a row was marked.
    pub async fn soft_remove(
        pool: &PgPool,
        fund_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fund_members SET deleted_at = NOW()
             WHERE fund_id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(fund_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count the active members of a fund.
    pub async fn count_active(pool: &PgPool, fund_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM fund_members WHERE fund_id = $1 AND deleted_at IS NULL",
        )
        .bind(fund_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
