//! Repository for the `funds` table.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::fund::{CreateFund, Fund, PublicFundInfo, UpdateFund};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, fund_type, owner_id, share_code, description, \
    last_message_id, last_message_at, open_dialog, \
    deleted_at, created_at, updated_at";

/// Provides CRUD operations for funds.
pub struct FundRepo;

impl FundRepo {
    /// Insert a new fund, returning the created row.
    ///
    /// A share-code collision violates `uq_funds_share_code`; callers treat
    /// that as a retry trigger, not a fatal error.
    pub async fn create(pool: &PgPool, input: &CreateFund) -> Result<Fund, sqlx::Error> {
        let query = format!(
            "INSERT INTO funds (name, fund_type, owner_id, share_code, description, open_dialog)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fund>(&query)
            .bind(&input.name)
            .bind(&input.fund_type)
            .bind(input.owner_id)
            .bind(&input.share_code)
            .bind(&input.description)
            .bind(input.open_dialog)
            .fetch_one(pool)
            .await
    }

    /// Find a fund by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Fund>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM funds WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Fund>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact-match lookup by share code. Excludes soft-deleted rows.
    ///
    /// There is deliberately no fuzzy or prefix variant: funds are private
    /// and discoverable only by the full code.
    pub async fn find_by_share_code(
        pool: &PgPool,
        share_code: &str,
    ) -> Result<Option<Fund>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM funds WHERE share_code = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Fund>(&query)
            .bind(share_code)
            .fetch_optional(pool)
            .await
    }

    /// Whether any fund (including soft-deleted ones) holds this share code.
    ///
    /// Pre-filter for the allocation loop; the unique constraint remains
    /// the backstop for concurrent allocations.
    pub async fn share_code_exists(pool: &PgPool, share_code: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM funds WHERE share_code = $1)")
                .bind(share_code)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Public projection for the share-code lookup: name, owner display
    /// name, and member count, nothing about the members themselves.
    pub async fn public_info_by_share_code(
        pool: &PgPool,
        share_code: &str,
    ) -> Result<Option<PublicFundInfo>, sqlx::Error> {
        sqlx::query_as::<_, PublicFundInfo>(
            "SELECT f.id, f.name, f.fund_type, f.share_code, f.description,
                    u.display_name AS owner_name,
                    (SELECT COUNT(*) FROM fund_members fm
                     WHERE fm.fund_id = f.id AND fm.deleted_at IS NULL) AS member_count
             FROM funds f
             JOIN users u ON u.id = f.owner_id
             WHERE f.share_code = $1 AND f.deleted_at IS NULL",
        )
        .bind(share_code)
        .fetch_optional(pool)
        .await
    }

    /// List every fund the user is an active member of.
    ///
    /// Unordered: the caller computes each fund's activity key and sorts in
    /// memory, because the key falls back from the denormalized message
    /// pointer to `updated_at`.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Fund>, sqlx::Error> {
        sqlx::query_as::<_, Fund>(
            "SELECT f.id, f.name, f.fund_type, f.owner_id, f.share_code, f.description,
                    f.last_message_id, f.last_message_at, f.open_dialog,
                    f.deleted_at, f.created_at, f.updated_at
             FROM funds f
             JOIN fund_members fm ON fm.fund_id = f.id
             WHERE fm.user_id = $1
               AND fm.deleted_at IS NULL
               AND f.deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update a fund. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFund,
    ) -> Result<Option<Fund>, sqlx::Error> {
        let query = format!(
            "UPDATE funds SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                open_dialog = COALESCE($4, open_dialog)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fund>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.open_dialog)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a fund by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE funds SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute the denormalized newest-message pointer from the messages
    /// table.
    ///
    /// Called after every message create or delete so list ordering stays
    /// correct without a live join at read time. Clears the pointer when
    /// the fund has no remaining messages.
    pub async fn refresh_last_message(pool: &PgPool, fund_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE funds SET
                last_message_id = (
                    SELECT id FROM messages
                    WHERE fund_id = $1 AND deleted_at IS NULL
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                ),
                last_message_at = (
                    SELECT created_at FROM messages
                    WHERE fund_id = $1 AND deleted_at IS NULL
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                )
             WHERE id = $1",
        )
        .bind(fund_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
