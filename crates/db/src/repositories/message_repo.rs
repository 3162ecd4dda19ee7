//! Repository for the `messages` table.

use sqlx::PgPool;
use fundmate_core::message::Extraction;
use fundmate_core::types::DbId;

use crate::models::message::{CreateMessage, Message};

const COLUMNS: &str = "\
    id, fund_id, user_id, status, body, spend_value, earn_value, content, \
    category_id, metadata, processed_at, failure_reason, transaction_id, \
    deleted_at, created_at, updated_at";

/// Provides CRUD and status transitions for messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a new message in the `pending` state.
    pub async fn create(pool: &PgPool, input: &CreateMessage) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (fund_id, user_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(input.fund_id)
            .bind(input.user_id)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Find a message by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a fund's messages, newest first.
    pub async fn list_by_fund(
        pool: &PgPool,
        fund_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE fund_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(fund_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a fund's messages, for pagination envelopes.
    pub async fn count_by_fund(pool: &PgPool, fund_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE fund_id = $1 AND deleted_at IS NULL",
        )
        .bind(fund_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Record a successful classification: extraction fields, the
    /// transaction link, `processed` status, and the processing timestamp,
    /// all in one statement. A non-`None` `body` also replaces the text
    /// (the edit path).
    ///
    /// Clears any failure reason from an earlier attempt.
    pub async fn mark_processed(
        pool: &PgPool,
        id: DbId,
        body: Option<&str>,
        extraction: &Extraction,
        transaction_id: DbId,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "UPDATE messages SET
                status = 'processed',
                body = COALESCE($2, body),
                spend_value = $3,
                earn_value = $4,
                content = $5,
                category_id = $6,
                metadata = $7,
                transaction_id = $8,
                processed_at = NOW(),
                failure_reason = NULL
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(body)
            .bind(extraction.spend_value)
            .bind(extraction.earn_value)
            .bind(&extraction.content)
            .bind(extraction.category_id)
            .bind(&extraction.metadata)
            .bind(transaction_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a failed classification. The raw text is kept so the user can
    /// see (and edit) what could not be parsed.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        reason: &str,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "UPDATE messages SET status = 'failed', failure_reason = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a message by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
