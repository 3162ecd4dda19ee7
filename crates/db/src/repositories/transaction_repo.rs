//! Repository for the `transactions` table.

use sqlx::PgPool;
use fundmate_core::message::Extraction;
use fundmate_core::types::{DbId, Timestamp};

use crate::models::transaction::{CreateTransaction, Transaction};

const COLUMNS: &str = "\
    id, fund_id, user_id, user_name, message_id, status, raw_prompt, \
    spend_value, earn_value, content, category_id, metadata, occurred_at, \
    deleted_at, created_at, updated_at";

/// Provides CRUD and aggregation queries for transactions.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a new transaction, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions
                (fund_id, user_id, user_name, message_id, raw_prompt,
                 spend_value, earn_value, content, category_id, metadata, occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(input.fund_id)
            .bind(input.user_id)
            .bind(&input.user_name)
            .bind(input.message_id)
            .bind(&input.raw_prompt)
            .bind(input.spend_value)
            .bind(input.earn_value)
            .bind(&input.content)
            .bind(input.category_id)
            .bind(&input.metadata)
            .bind(input.occurred_at)
            .fetch_one(pool)
            .await
    }

    /// Find a transaction by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM transactions WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the live transaction materialized from a given message, if any.
    ///
    /// The queue worker uses this to make redelivery idempotent: an existing
    /// row is overwritten instead of duplicated.
    pub async fn find_by_message_id(
        pool: &PgPool,
        message_id: DbId,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE message_id = $1 AND deleted_at IS NULL
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(message_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a transaction's extracted fields after re-classification.
    pub async fn update_from_extraction(
        pool: &PgPool,
        id: DbId,
        raw_prompt: &str,
        extraction: &Extraction,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "UPDATE transactions SET
                raw_prompt = $2,
                spend_value = $3,
                earn_value = $4,
                content = $5,
                category_id = $6,
                metadata = $7
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .bind(raw_prompt)
            .bind(extraction.spend_value)
            .bind(extraction.earn_value)
            .bind(&extraction.content)
            .bind(extraction.category_id)
            .bind(&extraction.metadata)
            .fetch_optional(pool)
            .await
    }

    /// List a fund's transactions, newest first by occurrence time.
    pub async fn list_by_fund(
        pool: &PgPool,
        fund_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE fund_id = $1 AND deleted_at IS NULL
             ORDER BY occurred_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(fund_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a fund's transactions, for pagination envelopes.
    pub async fn count_by_fund(pool: &PgPool, fund_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transactions WHERE fund_id = $1 AND deleted_at IS NULL",
        )
        .bind(fund_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Sum spend and earn over a fund's processed transactions within an
    /// optional time window. NULL sums coalesce to zero.
    pub async fn sum_for_fund(
        pool: &PgPool,
        fund_id: DbId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<(f64, f64), sqlx::Error> {
        let (spend, earn): (f64, f64) = sqlx::query_as(
            "SELECT COALESCE(SUM(spend_value), 0)::DOUBLE PRECISION,
                    COALESCE(SUM(earn_value), 0)::DOUBLE PRECISION
             FROM transactions
             WHERE fund_id = $1
               AND status = 'processed'
               AND deleted_at IS NULL
               AND ($2::TIMESTAMPTZ IS NULL OR occurred_at >= $2)
               AND ($3::TIMESTAMPTZ IS NULL OR occurred_at <= $3)",
        )
        .bind(fund_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
        Ok((spend, earn))
    }

    /// Soft-delete a transaction by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
